//! Editor options and the `:set` system.
//!
//! [`Options`] holds the values a pane renders with; [`parse_set`] turns
//! the arguments of `:set` into [`SetDirective`]s and [`Options::apply`]
//! carries them out. Option changes are never part of undo history.
//!
//! # Supported syntax
//!
//! | Syntax           | Effect                        |
//! |------------------|-------------------------------|
//! | `:set option`    | Enable boolean / show numeric |
//! | `:set nooption`  | Disable boolean               |
//! | `:set invoption` | Toggle boolean                |
//! | `:set option!`   | Toggle boolean                |
//! | `:set option?`   | Query current value           |
//! | `:set option=N`  | Assign numeric value          |
//! | `:set`           | Show changed options          |
//! | `:set all`       | Show all options              |
//!
//! # Option names
//!
//! | Full name        | Abbrev | Type    | Default |
//! |------------------|--------|---------|---------|
//! | `number`         | `nu`   | bool    | false   |
//! | `relativenumber` | `rnu`  | bool    | false   |
//! | `numberwidth`    | `nuw`  | integer | 4       |
//! | `tabstop`        | `ts`   | integer | 8       |
//! | `scrolloff`      | `so`   | integer | 0       |
//! | `wrap`           |        | bool    | true    |

use serde::{Deserialize, Serialize};

/// A parsed `:set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `:set option`
    On(String),
    /// `:set nooption`
    Off(String),
    /// `:set option!` or `:set invoption`
    Toggle(String),
    /// `:set option?`
    Query(String),
    /// `:set option=value`
    Assign(String, String),
    /// `:set`
    ShowChanged,
    /// `:set all`
    ShowAll,
}

/// Canonical option identity, resolved from a full name or abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionName {
    Number,
    RelativeNumber,
    NumberWidth,
    TabStop,
    ScrollOff,
    Wrap,
}

impl OptionName {
    fn resolve(name: &str) -> Option<Self> {
        match name {
            "number" | "nu" => Some(Self::Number),
            "relativenumber" | "rnu" => Some(Self::RelativeNumber),
            "numberwidth" | "nuw" => Some(Self::NumberWidth),
            "tabstop" | "ts" => Some(Self::TabStop),
            "scrolloff" | "so" => Some(Self::ScrollOff),
            "wrap" => Some(Self::Wrap),
            _ => None,
        }
    }

    const fn full(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::RelativeNumber => "relativenumber",
            Self::NumberWidth => "numberwidth",
            Self::TabStop => "tabstop",
            Self::ScrollOff => "scrolloff",
            Self::Wrap => "wrap",
        }
    }

    const fn is_bool(self) -> bool {
        matches!(self, Self::Number | Self::RelativeNumber | Self::Wrap)
    }

    const ALL: [Self; 6] = [
        Self::Number,
        Self::RelativeNumber,
        Self::NumberWidth,
        Self::TabStop,
        Self::ScrollOff,
        Self::Wrap,
    ];
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    OptionName::resolve(name).is_some_and(OptionName::is_bool)
}

/// Returns `true` if `name` is a known numeric option.
#[must_use]
pub fn is_numeric_option(name: &str) -> bool {
    OptionName::resolve(name).is_some_and(|o| !o.is_bool())
}

/// Parse the full `:set` arguments string into directives.
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single `:set` argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }
    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }
    // `number` starts with "no"; only strip when the rest is an option.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }
    if let Some(name) = arg.strip_prefix("inv") {
        if is_bool_option(name) {
            return SetDirective::Toggle(name.to_string());
        }
    }
    if is_numeric_option(arg) {
        return SetDirective::Query(arg.to_string());
    }
    SetDirective::On(arg.to_string())
}

/// Format a boolean option the way `:set` echoes it.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value { format!("  {name}") } else { format!("no{name}") }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Per-pane option values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub number: bool,
    pub relativenumber: bool,
    pub numberwidth: usize,
    pub tabstop: usize,
    pub scrolloff: usize,
    pub wrap: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            number: false,
            relativenumber: false,
            numberwidth: 4,
            tabstop: 8,
            scrolloff: 0,
            wrap: true,
        }
    }
}

impl Options {
    /// Apply a whole `:set` argument string.
    ///
    /// Returns the text to echo (query results) on success and the first
    /// error message otherwise. Directives before a failing one stay
    /// applied, as in Vim.
    ///
    /// # Errors
    ///
    /// The status-line error for an unknown option, a bad value or a
    /// boolean operation on a numeric option.
    pub fn apply_str(&mut self, args: &str) -> Result<Option<String>, String> {
        let mut echo: Vec<String> = Vec::new();
        for directive in parse_set(args) {
            if let Some(text) = self.apply(&directive)? {
                echo.push(text);
            }
        }
        Ok(if echo.is_empty() { None } else { Some(echo.join(" ")) })
    }

    /// Apply one directive.
    ///
    /// # Errors
    ///
    /// See [`apply_str`](Self::apply_str).
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, String> {
        match directive {
            SetDirective::ShowChanged => {
                let defaults = Self::default();
                let changed: Vec<String> = OptionName::ALL
                    .into_iter()
                    .filter(|&o| self.display(o) != defaults.display(o))
                    .map(|o| self.display(o))
                    .collect();
                Ok(Some(changed.join(" ")))
            }
            SetDirective::ShowAll => {
                let all: Vec<String> = OptionName::ALL.into_iter().map(|o| self.display(o)).collect();
                Ok(Some(all.join(" ")))
            }
            SetDirective::Query(name) => Ok(Some(self.display(resolve(name)?))),
            SetDirective::On(name) => self.set_bool(name, |_| true),
            SetDirective::Off(name) => self.set_bool(name, |_| false),
            SetDirective::Toggle(name) => self.set_bool(name, |v| !v),
            SetDirective::Assign(name, value) => {
                let option = resolve(name)?;
                if option.is_bool() {
                    return Err(format!("E474: Invalid argument: {name}={value}"));
                }
                let n: usize = value
                    .parse()
                    .map_err(|_| format!("E521: Number required after =: {name}={value}"))?;
                match option {
                    OptionName::NumberWidth if (1..=20).contains(&n) => self.numberwidth = n,
                    OptionName::TabStop if n > 0 => self.tabstop = n,
                    OptionName::ScrollOff => self.scrolloff = n,
                    _ => return Err(format!("E487: Argument must be positive: {name}={value}")),
                }
                Ok(None)
            }
        }
    }

    fn set_bool(&mut self, name: &str, f: impl Fn(bool) -> bool) -> Result<Option<String>, String> {
        let slot = match resolve(name)? {
            OptionName::Number => &mut self.number,
            OptionName::RelativeNumber => &mut self.relativenumber,
            OptionName::Wrap => &mut self.wrap,
            OptionName::NumberWidth | OptionName::TabStop | OptionName::ScrollOff => {
                return Err(format!("E474: Invalid argument: {name}"));
            }
        };
        *slot = f(*slot);
        Ok(None)
    }

    fn display(&self, option: OptionName) -> String {
        match option {
            OptionName::Number => format_bool(option.full(), self.number),
            OptionName::RelativeNumber => format_bool(option.full(), self.relativenumber),
            OptionName::NumberWidth => format!("  numberwidth={}", self.numberwidth),
            OptionName::TabStop => format!("  tabstop={}", self.tabstop),
            OptionName::ScrollOff => format!("  scrolloff={}", self.scrolloff),
            OptionName::Wrap => format_bool(option.full(), self.wrap),
        }
    }

    /// Whether any gutter is drawn.
    #[must_use]
    pub const fn gutter_enabled(&self) -> bool {
        self.number || self.relativenumber
    }
}

fn resolve(name: &str) -> Result<OptionName, String> {
    OptionName::resolve(name).ok_or_else(|| format!("E518: Unknown option: {name}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_set_arg ─────────────────────────────────────────────────────

    #[test]
    fn parse_boolean_forms() {
        assert_eq!(parse_set_arg("nu"), SetDirective::On("nu".into()));
        assert_eq!(parse_set_arg("number"), SetDirective::On("number".into()));
        assert_eq!(parse_set_arg("nonu"), SetDirective::Off("nu".into()));
        assert_eq!(parse_set_arg("nornu"), SetDirective::Off("rnu".into()));
        assert_eq!(parse_set_arg("invnu"), SetDirective::Toggle("nu".into()));
        assert_eq!(parse_set_arg("rnu!"), SetDirective::Toggle("rnu".into()));
        assert_eq!(parse_set_arg("nu?"), SetDirective::Query("nu".into()));
    }

    #[test]
    fn parse_numeric_forms() {
        assert_eq!(parse_set_arg("nuw=6"), SetDirective::Assign("nuw".into(), "6".into()));
        assert_eq!(parse_set_arg("ts"), SetDirective::Query("ts".into()));
        assert_eq!(parse_set(""), vec![SetDirective::ShowChanged]);
        assert_eq!(parse_set("all"), vec![SetDirective::ShowAll]);
    }

    #[test]
    fn unknown_names_parse_as_on() {
        assert_eq!(parse_set_arg("nofoobar"), SetDirective::On("nofoobar".into()));
    }

    // ── Options::apply ───────────────────────────────────────────────────

    #[test]
    fn number_and_relativenumber() {
        let mut opts = Options::default();
        assert_eq!(opts.apply_str("nu rnu"), Ok(None));
        assert!(opts.number && opts.relativenumber);
        opts.apply_str("nonumber").ok();
        assert!(!opts.number);
        opts.apply_str("invrnu").ok();
        assert!(!opts.relativenumber);
        assert!(!opts.gutter_enabled());
    }

    #[test]
    fn query_echoes_value() {
        let mut opts = Options::default();
        assert_eq!(opts.apply_str("nu?"), Ok(Some("nonumber".into())));
        opts.apply_str("nu").ok();
        assert_eq!(opts.apply_str("number?"), Ok(Some("  number".into())));
        assert_eq!(opts.apply_str("nuw"), Ok(Some("  numberwidth=4".into())));
    }

    #[test]
    fn numberwidth_assignment() {
        let mut opts = Options::default();
        assert_eq!(opts.apply_str("nuw=6"), Ok(None));
        assert_eq!(opts.numberwidth, 6);
        assert!(opts.apply_str("nuw=0").is_err());
        assert_eq!(
            opts.apply_str("nuw=x"),
            Err("E521: Number required after =: nuw=x".into())
        );
        assert_eq!(opts.numberwidth, 6);
    }

    #[test]
    fn unknown_option_is_e518() {
        let mut opts = Options::default();
        assert_eq!(opts.apply_str("bogus"), Err("E518: Unknown option: bogus".into()));
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn show_changed_lists_only_changed() {
        let mut opts = Options::default();
        assert_eq!(opts.apply_str(""), Ok(Some(String::new())));
        opts.apply_str("rnu ts=4").ok();
        assert_eq!(opts.apply_str(""), Ok(Some("  relativenumber   tabstop=4".into())));
    }

    #[test]
    fn wrap_and_scrolloff() {
        let mut opts = Options::default();
        assert!(opts.wrap);
        assert_eq!(opts.apply_str("nowrap so=3"), Ok(None));
        assert!(!opts.wrap);
        assert_eq!(opts.scrolloff, 3);
        assert_eq!(opts.apply_str("wrap?"), Ok(Some("nowrap".into())));
        assert_eq!(opts.apply_str("so=0"), Ok(None));
    }
}
