// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // any single expression
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

#[macro_export]
macro_rules! join {
    // String-type concatenation shorthand!
    ($first:expr $(, $rest:expr)+ $(,)?) => {{
        let mut s = ::std::string::String::from($first);
        $(
            s.push_str($rest);
        )+
        s
    }};
}

/// Record a skipped row on a `ParseOutput` and move on to the next loop iteration.
/// Only usable inside the row loop of an adapter.
#[macro_export]
macro_rules! skip_row {
    ($out:expr, $row:expr, $($arg:tt)*) => {{
        let reason = ::std::format!($($arg)*);
        ::log::debug!("row {}: skipped ({})", $row, reason);
        $out.skipped.push($crate::adapters::SkippedRow { row: $row, reason });
        continue;
    }};
}
