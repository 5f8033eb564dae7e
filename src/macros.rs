#[macro_export]
/// A macro to construct a [`Numeric`] from a literal.
/// Converts the input tokens to a string, and then parses the string into a
/// [`Numeric`]. Panics if the provided input is not a valid [`Numeric`]
/// literal.
///
/// [`Numeric`]: crate::Numeric
///
/// # Examples:
/// ```
/// use decfix::numeric;
///
/// assert!(numeric!(1.753).to_string() == "1.753");
/// assert!(numeric!(0).is_zero());
/// assert!(numeric!(-0.1).is_negative());
/// ```
macro_rules! numeric {
    ($l:expr) => {
        <$crate::Numeric as ::std::str::FromStr>::from_str(stringify!($l))
            .unwrap_or_else(|e| panic!("{}", e.to_string()))
    };
}
