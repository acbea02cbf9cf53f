//! Normalize argv: unbundle short options and split `--name=value`.

use super::charset::CharSet;

/// How many values a short flag takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Niladic,
    Monadic,
}

/// The options [`normalize`] knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSpec {
    niladic: CharSet,
    monadic: CharSet,
    /// Alias groups, e.g. `["foo", "bar"]` for `"foo|bar"`.
    long: Vec<Vec<String>>,
}

impl OptionSpec {
    /// Build an option table from flag alphabets and pipe-delimited long-name groups.
    ///
    /// A character listed as both niladic and monadic is treated as niladic.
    pub fn new<S: AsRef<str>>(niladic: &str, monadic: &str, long: &[S]) -> Self {
        let niladic = CharSet::from(niladic);
        let monadic = monadic.chars().filter(|c| !niladic.contains(*c)).collect();
        let long = long
            .iter()
            .map(|group| {
                group
                    .as_ref()
                    .split('|')
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|group| !group.is_empty())
            .collect();
        Self {
            niladic,
            monadic,
            long,
        }
    }

    pub fn arity(&self, flag: char) -> Option<Arity> {
        if self.niladic.contains(flag) {
            Some(Arity::Niladic)
        } else if self.monadic.contains(flag) {
            Some(Arity::Monadic)
        } else {
            None
        }
    }

    /// Whether `name` (without dashes) appears in any alias group.
    pub fn is_long(&self, name: &str) -> bool {
        self.long.iter().flatten().any(|known| known == name)
    }

    /// Whether `token` is exactly one recognized option: `-x` or `--name`.
    fn is_exact_option(&self, token: &str) -> bool {
        if let Some(name) = token.strip_prefix("--") {
            return self.is_long(name);
        }
        let Some(flag) = token.strip_prefix('-') else {
            return false;
        };
        let mut chars = flag.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.arity(c).is_some(),
            _ => false,
        }
    }
}

/// Anything that can be read as an argv.
///
/// A bare string is a one-element argv.
pub trait AsArgv {
    fn as_argv(&self) -> Vec<&str>;
}

impl AsArgv for str {
    fn as_argv(&self) -> Vec<&str> {
        vec![self]
    }
}

impl AsArgv for String {
    fn as_argv(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl<S: AsRef<str>> AsArgv for [S] {
    fn as_argv(&self) -> Vec<&str> {
        self.iter().map(AsRef::as_ref).collect()
    }
}

impl<S: AsRef<str>> AsArgv for Vec<S> {
    fn as_argv(&self) -> Vec<&str> {
        self.as_slice().as_argv()
    }
}

impl<S: AsRef<str>, const N: usize> AsArgv for [S; N] {
    fn as_argv(&self) -> Vec<&str> {
        self.as_slice().as_argv()
    }
}

/// Outcome of scanning one bundle.
enum Bundle {
    Done,
    /// The last flag was monadic and the bundle had no value left for it.
    NeedsValue,
}

/// Per-call scan state.
struct Scan<'a> {
    spec: &'a OptionSpec,
    out: Vec<String>,
    /// Set by the first recognized short flag; later bundles with an unknown
    /// leading character are still expanded.
    sticky: bool,
}

impl Scan<'_> {
    fn unbundle(&mut self, bundle: &str) -> Bundle {
        let mut expanding = self.sticky;
        for (idx, c) in bundle.char_indices() {
            match self.spec.arity(c) {
                Some(Arity::Niladic) => {
                    self.out.push(format!("-{c}"));
                    expanding = true;
                }
                Some(Arity::Monadic) => {
                    self.out.push(format!("-{c}"));
                    self.sticky = true;
                    let rest = &bundle[idx + c.len_utf8()..];
                    if rest.is_empty() {
                        return Bundle::NeedsValue;
                    }
                    self.out.push(rest.to_string());
                    return Bundle::Done;
                }
                None if expanding => self.out.push(format!("-{c}")),
                None => {
                    self.out.push(format!("-{bundle}"));
                    return Bundle::Done;
                }
            }
        }
        if expanding {
            self.sticky = true;
        }
        Bundle::Done
    }

    /// Take `next` as a value unless it is itself a recognized option.
    fn take_value(&mut self, next: Option<&str>) -> bool {
        match next {
            Some(value) if !self.spec.is_exact_option(value) => {
                self.out.push(value.to_string());
                true
            }
            _ => false,
        }
    }
}

/// Rewrite `argv`, expanding `-abc` bundles and splitting known `--name=value`.
///
/// Returns a new vector; `argv` is only borrowed. Unknown options are left as
/// they are, and token order is preserved.
pub fn normalize<A: AsArgv + ?Sized>(argv: &A, spec: &OptionSpec) -> Vec<String> {
    let args = argv.as_argv();
    let mut scan = Scan {
        spec,
        out: Vec::with_capacity(args.len()),
        sticky: false,
    };

    let mut i = 0;
    while i < args.len() {
        let arg = args[i];
        let next = args.get(i + 1).copied();
        i += 1;

        if let Some(long) = arg.strip_prefix("--") {
            match long.split_once('=') {
                Some((name, value)) if spec.is_long(name) => {
                    scan.out.push(format!("--{name}"));
                    scan.out.push(value.to_string());
                }
                None if spec.is_long(long) => {
                    scan.out.push(arg.to_string());
                    if scan.take_value(next) {
                        i += 1;
                    }
                }
                _ => scan.out.push(arg.to_string()),
            }
            continue;
        }

        match arg.strip_prefix('-') {
            Some(bundle) if !bundle.is_empty() => {
                if let Bundle::NeedsValue = scan.unbundle(bundle) {
                    if scan.take_value(next) {
                        i += 1;
                    }
                }
            }
            _ => scan.out.push(arg.to_string()),
        }
    }

    scan.out
}
