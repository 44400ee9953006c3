//! Folder-pattern compiler.
//!
//! A folder pattern is literal text interleaved with `{...}` placeholder
//! blocks:
//!
//! ```text
//! pattern   := (literal | block)*
//! literal   := any char except '{' and '\'  |  '\'  (path separator)
//! block     := '{' item* '}'
//! item      := 'e' | 'n' | 'v' | 's' | 'a' | 'l' | '*'
//!            | 'p' [sep]
//!            | digits
//! ```
//!
//! Every placeholder except `n` yields the same text for all normalization
//! methods. `n` yields each method's own name, so from that point on the
//! block's text diverges per method. Blocks are committed to every method's
//! path at their closing `}`.

use super::errors::LayoutError;
use std::iter::Peekable;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::str::CharIndices;

/// Named values the placeholders of a folder pattern expand to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitutions {
    /// `{e}`
    pub experiment: String,
    /// `{v}`
    pub variance_adjustment: String,
    /// `{s}`
    pub score_method: String,
    /// `{a}`
    pub aggregate: String,
    /// `{l}`
    pub log_transform: String,
    /// `{*}` is empty for multiplicative normalization, `+` otherwise
    pub multiplicative: bool,
    /// `{p}`
    pub parameters: Vec<String>,
    /// Root all compiled folders are placed under
    pub output_dir: PathBuf,
}

/// Compiled output folder per normalization method, in method order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderMap {
    entries: Vec<(String, PathBuf)>,
}

impl FolderMap {
    pub fn get(&self, method: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, path)| path.as_path())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(m, p)| (m.as_str(), p.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Value produced by the latest placeholder, held until the next item so a
/// following digit run can still truncate it
#[derive(Debug)]
enum Pending {
    Shared(String),
    PerMethod(Vec<String>),
    /// Parameters seen after divergence; committed ahead of the per-method text
    Literal(String),
}

struct PatternCompiler<'a> {
    methods: Vec<&'a str>,
    subs: &'a Substitutions,
    paths: Vec<String>,
    /// Text common to all methods since the last commit
    common: String,
    /// Per-method text once an `n` has been seen in the current block
    divergent: Option<Vec<String>>,
    pending: Option<Pending>,
}

impl<'a> PatternCompiler<'a> {
    fn new(methods: Vec<&'a str>, subs: &'a Substitutions) -> Self {
        let paths = vec![String::new(); methods.len()];
        Self {
            methods,
            subs,
            paths,
            common: String::new(),
            divergent: None,
            pending: None,
        }
    }

    fn run(mut self, pattern: &str) -> Result<Vec<(String, String)>, LayoutError> {
        let mut chars = pattern.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '\\' => self.common.push(MAIN_SEPARATOR),
                '{' => self.block(offset, &mut chars)?,
                other => self.common.push(other),
            }
        }
        self.commit();

        Ok(self
            .methods
            .iter()
            .map(|m| m.to_string())
            .zip(self.paths)
            .collect())
    }

    fn block(
        &mut self,
        open_offset: usize,
        chars: &mut Peekable<CharIndices<'_>>,
    ) -> Result<(), LayoutError> {
        loop {
            let Some((_, c)) = chars.next() else {
                return Err(LayoutError::configuration(format!(
                    "unterminated '{{' at offset {} in folder pattern",
                    open_offset
                )));
            };

            match c {
                '}' => {
                    self.commit();
                    return Ok(());
                }
                'e' => self.set_shared(self.subs.experiment.clone()),
                'v' => self.set_shared(self.subs.variance_adjustment.clone()),
                's' => self.set_shared(self.subs.score_method.clone()),
                'a' => self.set_shared(self.subs.aggregate.clone()),
                'l' => self.set_shared(self.subs.log_transform.clone()),
                '*' => {
                    let sign = if self.subs.multiplicative { "" } else { "+" };
                    self.set_shared(sign.to_string());
                }
                'n' => {
                    self.flush_pending();
                    let names = self.methods.iter().map(|m| m.to_string()).collect();
                    self.pending = Some(Pending::PerMethod(names));
                }
                'p' => {
                    let separator = match chars.peek() {
                        Some(&(_, sep)) if !sep.is_ascii_digit() && sep != '}' => {
                            chars.next();
                            Some(sep)
                        }
                        _ => None,
                    };
                    let joined = join_parameters(&self.subs.parameters, separator);
                    self.flush_pending();
                    self.pending = Some(match self.divergent {
                        Some(_) => Pending::Literal(joined),
                        None => Pending::Shared(joined),
                    });
                }
                d if d.is_ascii_digit() => {
                    let mut digits = String::from(d);
                    while let Some(&(_, next)) = chars.peek() {
                        if !next.is_ascii_digit() {
                            break;
                        }
                        digits.push(next);
                        chars.next();
                    }
                    // An absurdly long run cannot constrain anything
                    let limit = digits.parse().unwrap_or(usize::MAX);
                    self.truncate_pending(limit);
                }
                // Unknown placeholders are ignored
                _ => self.flush_pending(),
            }
        }
    }

    fn set_shared(&mut self, value: String) {
        self.flush_pending();
        self.pending = Some(Pending::Shared(value));
    }

    fn truncate_pending(&mut self, limit: usize) {
        match &mut self.pending {
            Some(Pending::Shared(value) | Pending::Literal(value)) => {
                *value = abbreviate(value, limit)
            }
            Some(Pending::PerMethod(values)) => {
                for value in values.iter_mut() {
                    *value = abbreviate(value, limit);
                }
            }
            None => {}
        }
    }

    fn flush_pending(&mut self) {
        match self.pending.take() {
            Some(Pending::Shared(value)) => match &mut self.divergent {
                Some(per_method) => {
                    for text in per_method.iter_mut() {
                        text.push_str(&value);
                    }
                }
                None => self.common.push_str(&value),
            },
            Some(Pending::PerMethod(values)) => match &mut self.divergent {
                Some(per_method) => {
                    for (text, value) in per_method.iter_mut().zip(values) {
                        text.push_str(&value);
                    }
                }
                None => self.divergent = Some(values),
            },
            Some(Pending::Literal(value)) => self.common.push_str(&value),
            None => {}
        }
    }

    fn commit(&mut self) {
        self.flush_pending();
        let divergent = self.divergent.take();
        for (idx, path) in self.paths.iter_mut().enumerate() {
            path.push_str(&self.common);
            if let Some(text) = divergent.as_ref().and_then(|d| d.get(idx)) {
                path.push_str(text);
            }
        }
        self.common.clear();
    }
}

/// Compile a folder pattern into one output folder per normalization method.
///
/// # Errors
///
/// `LayoutError::Configuration` if a `{` block is never closed.
///
/// # Example
///
/// ```
/// use cellhts_layout::layout::{Substitutions, compile};
///
/// let subs = Substitutions {
///     experiment: "run1".into(),
///     output_dir: "/data/out".into(),
///     ..Default::default()
/// };
/// let folders = compile("{e}\\{n}", &["median", "POC"], &subs).unwrap();
/// assert_eq!(
///     folders.get("POC").unwrap(),
///     std::path::Path::new("/data/out").join("run1").join("POC")
/// );
/// ```
pub fn compile<S: AsRef<str>>(
    pattern: &str,
    methods: &[S],
    subs: &Substitutions,
) -> Result<FolderMap, LayoutError> {
    let methods: Vec<&str> = methods.iter().map(|m| m.as_ref()).collect();
    let method_count = methods.len();

    let relative = PatternCompiler::new(methods, subs).run(pattern)?;
    let entries = relative
        .into_iter()
        .map(|(method, rel)| (method, under_root(&subs.output_dir, &rel)))
        .collect();

    tracing::debug!(pattern, methods = method_count, "compiled folder pattern");
    Ok(FolderMap { entries })
}

/// Append the components of `relative` to `root`; a leading separator never
/// replaces the root
fn under_root(root: &Path, relative: &str) -> PathBuf {
    relative
        .split(MAIN_SEPARATOR)
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | ',' | '_')
}

fn sanitize(value: &str) -> String {
    value.chars().filter(|&c| is_safe_char(c)).collect()
}

fn join_parameters(parameters: &[String], separator: Option<char>) -> String {
    let cleaned: Vec<String> = parameters.iter().map(|p| sanitize(p)).collect();
    match separator {
        Some(sep) => cleaned.join(&sep.to_string()),
        None => cleaned.concat(),
    }
}

/// Collapse every `Upper` + two-or-more `lower` run to its capital letter
fn collapse_camel_runs(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_uppercase() {
            let run = chars[i + 1..]
                .iter()
                .take_while(|n| n.is_ascii_lowercase())
                .count();
            if run >= 2 {
                out.push(c);
                i += 1 + run;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

/// Shorten `value` to at most `limit` characters.
///
/// Each lossy rule is tried on the original value in turn and the first
/// result that fits wins: drop `"Cell"`, drop `"Nuc "`, drop characters
/// outside `[A-Za-z0-9 ,_]`, collapse capitalised words to their initial.
/// If none of them is short enough the value is hard-truncated.
///
/// ```
/// use cellhts_layout::layout::abbreviate;
///
/// assert_eq!(abbreviate("Cell Count", 6), " Count");
/// assert_eq!(abbreviate("Cell Count", 2), "Ce");
/// assert_eq!(abbreviate("median", 10), "median");
/// ```
pub fn abbreviate(value: &str, limit: usize) -> String {
    let fits = |s: &str| s.chars().count() <= limit;
    if fits(value) {
        return value.to_string();
    }

    let rules: [fn(&str) -> String; 4] = [
        |s| s.replace("Cell", ""),
        |s| s.replace("Nuc ", ""),
        sanitize,
        collapse_camel_runs,
    ];

    rules
        .iter()
        .map(|rule| rule(value))
        .find(|candidate| fits(candidate))
        .unwrap_or_else(|| value.chars().take(limit).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs() -> Substitutions {
        Substitutions {
            experiment: "run1".to_string(),
            variance_adjustment: "byExperiment".to_string(),
            score_method: "zscore".to_string(),
            aggregate: "mean".to_string(),
            log_transform: "log".to_string(),
            multiplicative: false,
            parameters: vec!["Cell Count".to_string(), "Nuc Intensity".to_string()],
            output_dir: PathBuf::from("/out"),
        }
    }

    fn rel(parts: &[&str]) -> PathBuf {
        parts.iter().fold(PathBuf::from("/out"), |p, s| p.join(s))
    }

    #[test]
    fn test_shared_placeholders() {
        let folders = compile("{e}_{s}_{a}_{v}_{l}", &["median"], &subs()).unwrap();
        assert_eq!(
            folders.get("median").unwrap(),
            rel(&["run1_zscore_mean_byExperiment_log"])
        );
    }

    #[test]
    fn test_method_divergence_within_block() {
        let folders = compile("x{e-n-s}y", &["median", "POC"], &subs()).unwrap();
        // '-' is an unknown placeholder inside a block and produces nothing
        assert_eq!(folders.get("median").unwrap(), rel(&["xrun1medianzscorey"]));
        assert_eq!(folders.get("POC").unwrap(), rel(&["xrun1POCzscorey"]));
    }

    #[test]
    fn test_method_name_truncation() {
        let folders = compile("{n3}", &["median", "POC"], &subs()).unwrap();
        assert_eq!(folders.get("median").unwrap(), rel(&["med"]));
        assert_eq!(folders.get("POC").unwrap(), rel(&["POC"]));
    }

    #[test]
    fn test_parameter_separator() {
        let folders = compile("{p,}", &["median"], &subs()).unwrap();
        assert_eq!(
            folders.get("median").unwrap(),
            rel(&["Cell Count,Nuc Intensity"])
        );

        let folders = compile("{p}", &["median"], &subs()).unwrap();
        assert_eq!(
            folders.get("median").unwrap(),
            rel(&["Cell CountNuc Intensity"])
        );
    }

    #[test]
    fn test_parameter_sanitizing() {
        let mut s = subs();
        s.parameters = vec!["Area (µm²)".to_string(), "Intensity/2".to_string()];
        let folders = compile("{p_}", &["median"], &s).unwrap();
        assert_eq!(folders.get("median").unwrap(), rel(&["Area m_Intensity2"]));
    }

    #[test]
    fn test_multiplicative_sign() {
        let mut s = subs();
        let folders = compile("{n}{*}", &["median"], &s).unwrap();
        assert_eq!(folders.get("median").unwrap(), rel(&["median+"]));

        s.multiplicative = true;
        let folders = compile("{n}{*}", &["median"], &s).unwrap();
        assert_eq!(folders.get("median").unwrap(), rel(&["median"]));
    }

    #[test]
    fn test_unterminated_block() {
        let err = compile("{e}\\{n", &["median"], &subs()).unwrap_err();
        assert!(matches!(err, LayoutError::Configuration(msg) if msg.contains("offset 4")));
    }

    #[test]
    fn test_stray_close_is_literal() {
        let folders = compile("a}b", &["median"], &subs()).unwrap();
        assert_eq!(folders.get("median").unwrap(), rel(&["a}b"]));
    }

    #[test]
    fn test_leading_separator_stays_under_output_dir() {
        let folders = compile("\\{e}", &["median"], &subs()).unwrap();
        assert_eq!(folders.get("median").unwrap(), rel(&["run1"]));

        let folders = compile("\\\\{e}\\\\{n}\\", &["median"], &subs()).unwrap();
        assert_eq!(folders.get("median").unwrap(), rel(&["run1", "median"]));
    }

    #[test]
    fn test_parameters_after_method_precede_it() {
        let mut s = subs();
        s.parameters = vec!["X".to_string()];
        let folders = compile("{np}", &["median", "POC"], &s).unwrap();
        assert_eq!(folders.get("median").unwrap(), rel(&["Xmedian"]));
        assert_eq!(folders.get("POC").unwrap(), rel(&["XPOC"]));

        let folders = compile("{pn}", &["median"], &s).unwrap();
        assert_eq!(folders.get("median").unwrap(), rel(&["Xmedian"]));
    }

    #[test]
    fn test_parameters_after_method_truncate() {
        let folders = compile("{n3p2}", &["median"], &subs()).unwrap();
        assert_eq!(folders.get("median").unwrap(), rel(&["Cemed"]));
    }

    #[test]
    fn test_no_methods() {
        let folders = compile("{n}", &[] as &[&str], &subs()).unwrap();
        assert!(folders.is_empty());
    }

    #[test]
    fn test_method_order_is_kept() {
        let folders = compile("{n}", &["z", "a", "m"], &subs()).unwrap();
        let order: Vec<&str> = folders.iter().map(|(m, _)| m).collect();
        assert_eq!(order, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_abbreviate_rules_in_order() {
        assert_eq!(abbreviate("Cell Count", 20), "Cell Count");
        assert_eq!(abbreviate("Nuc Intensity", 9), "Intensity");
        assert_eq!(abbreviate("Area (px)", 7), "Area px");
        assert_eq!(abbreviate("MeanIntensity", 4), "MI");
        assert_eq!(abbreviate("abcdefgh", 3), "abc");
        assert_eq!(abbreviate("anything", 0), "");
    }

    #[test]
    fn test_collapse_camel_runs() {
        assert_eq!(collapse_camel_runs("MeanNucIntensity"), "MNI");
        assert_eq!(collapse_camel_runs("ABc"), "ABc");
        assert_eq!(collapse_camel_runs("x Count"), "x C");
    }
}
