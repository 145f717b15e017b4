use {crate::prelude::*, colored::ColoredString};

/// A grey separator line between command sections.
pub(crate) fn separator() -> ColoredString {
    "\n-=-=-=-=-=-=-=-\n".truecolor(100, 100, 100)
}

/// Print the title of the currently executed command.
#[macro_export]
macro_rules! command_title {
    ($($arg:tt)*) => {
        println!(
            "{arrow} {title}{separator}",
            arrow = "\u{25b6}".bold().purple(),
            title = format!($($arg)*).bold(),
            separator = $crate::display::separator()
        );
    };
}
