use colored::Colorize;
use once_cell::sync::Lazy;

pub static SUCCESS: Lazy<colored::ColoredString> = Lazy::new(|| "[ECCTL]".green());
pub static FAIL: Lazy<colored::ColoredString> = Lazy::new(|| "[ECCTL]".red());
pub static WARN: Lazy<colored::ColoredString> = Lazy::new(|| "[ECCTL]".yellow());
