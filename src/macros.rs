/// Builds the `&[&dyn Render]` slice every printer method takes.
///
/// ```
/// use ptc::{Render, ptc_args};
///
/// let values: &[&dyn Render] = ptc_args!("a", 1, vec![2, 3]);
/// assert_eq!(values.len(), 3);
/// ```
#[macro_export]
macro_rules! ptc_args {
    ($($value:expr),* $(,)?) => {
        &[$(&$value as &dyn $crate::Render),*]
    };
}

/// Prints the values to standard output with the default printer.
///
/// Evaluates to `io::Result<()>`. With no values only the terminator is
/// printed.
///
/// ```no_run
/// ptc::ptc_print!("answer:", 42)?;
/// ptc::ptc_print!()?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[macro_export]
macro_rules! ptc_print {
    () => {
        $crate::printer().print(&[])
    };
    ($($value:expr),+ $(,)?) => {
        $crate::printer().print($crate::ptc_args!($($value),+))
    };
}

/// Prints the values to standard error with the default printer.
///
/// Evaluates to `io::Result<()>`.
#[macro_export]
macro_rules! ptc_eprint {
    () => {
        $crate::printer().eprint(&[])
    };
    ($($value:expr),+ $(,)?) => {
        $crate::printer().eprint($crate::ptc_args!($($value),+))
    };
}

/// Prints the values to the given sink with the default printer.
///
/// The sink is borrowed mutably, so it can be used again afterwards.
///
/// ```
/// let mut out = Vec::new();
/// ptc::ptc_fprint!(out, "x", 'y')?;
/// ptc::ptc_fprint!(out)?;
/// assert_eq!(out, b"x y\n\n");
/// # Ok::<(), std::io::Error>(())
/// ```
#[macro_export]
macro_rules! ptc_fprint {
    ($sink:expr $(,)?) => {
        $crate::printer().print_to(&mut $sink, &[])
    };
    ($sink:expr, $($value:expr),+ $(,)?) => {
        $crate::printer().print_to(&mut $sink, $crate::ptc_args!($($value),+))
    };
}

/// Formats the values with the default printer and returns a `String`.
///
/// ```
/// assert_eq!(ptc::ptc_format!(1, "two", 3.5), "1 two 3.5\n");
/// assert_eq!(ptc::ptc_format!(), "");
/// ```
#[macro_export]
macro_rules! ptc_format {
    () => {
        $crate::printer().format(&[])
    };
    ($($value:expr),+ $(,)?) => {
        $crate::printer().format($crate::ptc_args!($($value),+))
    };
}
