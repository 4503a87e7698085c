// Diagnostics go to the `log` facade when the `logging` feature is enabled.
// Without it the arguments are still type-checked but never evaluated.
cfg_if::cfg_if! {
    if #[cfg(feature = "logging")] {
        macro_rules! debug {
            ($($arg:tt)*) => {
                log::debug!($($arg)*)
            };
        }

        macro_rules! warn {
            ($($arg:tt)*) => {
                log::warn!($($arg)*)
            };
        }
    } else {
        macro_rules! debug {
            ($($arg:tt)*) => {
                if false {
                    let _ = ::core::format_args!($($arg)*);
                }
            };
        }

        macro_rules! warn {
            ($($arg:tt)*) => {
                if false {
                    let _ = ::core::format_args!($($arg)*);
                }
            };
        }
    }
}
