// Macros for user-facing output. Results go to stdout, notes to stderr.

#[macro_export]
macro_rules! ui_ok {
    ($($arg:tt)*) => {{
        if $crate::ui::color() {
            use owo_colors::OwoColorize;
            println!("{} {}", "✔".green(), format_args!($($arg)*));
        } else {
            println!("✔ {}", format_args!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! ui_warn {
    ($($arg:tt)*) => {{
        if $crate::ui::color() {
            use owo_colors::OwoColorize;
            eprintln!("{} {}", "⚠".yellow(), format_args!($($arg)*));
        } else {
            eprintln!("⚠ {}", format_args!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! ui_out {
    ($($arg:tt)*) => {{
        println!("{}", format_args!($($arg)*));
    }};
}

use std::sync::atomic::{AtomicBool, Ordering};

static COLOR: AtomicBool = AtomicBool::new(false);

pub fn set_color(enabled: bool) {
    COLOR.store(enabled, Ordering::Relaxed);
}

pub fn color() -> bool {
    COLOR.load(Ordering::Relaxed)
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> color_eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
