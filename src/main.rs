mod cli;

use cellhts_layout::LayoutError;

fn main() {
    if let Err(e) = cli::run() {
        // LayoutError renders its own `error:`/`hint:` block
        if e.downcast_ref::<LayoutError>().is_some() {
            eprintln!("{}", e);
        } else {
            eprintln!("error: {}", e);
        }
        std::process::exit(1);
    }
}
