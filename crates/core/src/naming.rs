//! Output filename conventions for engine results.
//!
//! ComfyUI's save node writes results as `<prefix>_<counter>.png` with a
//! zero-padded counter and, by default, a trailing underscore before the
//! extension (`output_00012_.png`). The relay identifies fresh results by
//! that shape and ranks them by counter value.

use regex::Regex;

use crate::error::CoreError;

/// Compiled matcher for `<prefix>_<digits>` PNG output names.
///
/// Accepts both `output_00012_.png` (engine default) and `output_12.png`
/// (trailing underscore disabled); anything else is not a result file.
pub struct OutputPattern {
    re: Regex,
}

impl OutputPattern {
    /// Build the matcher for a filename prefix.
    ///
    /// The prefix is taken literally; regex metacharacters in it are
    /// escaped, so a prefix like `out.put` only matches itself.
    pub fn new(prefix: &str) -> Self {
        let re = Regex::new(&format!(r"^{}_(\d+)_?\.png$", regex::escape(prefix)))
            .expect("output pattern is statically well-formed");
        Self { re }
    }

    /// Extract the numeric counter if `filename` matches the pattern.
    ///
    /// Returns `None` for non-matching names and for counters that do not
    /// fit in a `u64` -- the engine's counters are small, so such a name
    /// was not written by it.
    pub fn suffix(&self, filename: &str) -> Option<u64> {
        self.re.captures(filename)?.get(1)?.as_str().parse().ok()
    }

    /// Pick the matching filename with the largest counter.
    ///
    /// Comparison is numeric, not lexicographic: `output_00012_.png`
    /// outranks `output_9_.png`. Returns `None` when nothing matches.
    pub fn largest<'a, I>(&self, names: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter_map(|name| self.suffix(name).map(|suffix| (suffix, name)))
            .max_by_key(|(suffix, _)| *suffix)
            .map(|(_, name)| name)
    }
}

/// Validate that a client-supplied filename is a plain basename.
///
/// Rejects empty names, `.`/`..`, and anything containing a path
/// separator or NUL, so a filename can never address outside the
/// directory it is joined to.
pub fn validate_basename(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Filename must not be empty".to_string(),
        ));
    }
    if name == "." || name == ".." {
        return Err(CoreError::Validation(format!("Unsafe filename: '{name}'")));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(CoreError::Validation(format!(
            "Filename must not contain path separators: '{name}'"
        )));
    }
    Ok(())
}
