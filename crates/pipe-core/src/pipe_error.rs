use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipeErr {
    ClockTooSlow { min_hz: u64, found_hz: u64 },
    InvalidValue { field: &'static str, value: u64 },
    InconsistentLength { expected: usize, found: usize },
}

impl fmt::Display for PipeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipeErr::ClockTooSlow { min_hz, found_hz } => {
                write!(f, "system clock {} Hz is below the minimum of {} Hz", found_hz, min_hz)
            }
            PipeErr::InvalidValue { field, value } => write!(f, "invalid value {} for {}", value, field),
            PipeErr::InconsistentLength { expected, found } => {
                write!(f, "inconsistent length: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for PipeErr {}

/// Checks that a configured value is non-zero. If not, returns PipeErr::InvalidValue
#[macro_export]
macro_rules! expect_nonzero {
    ($value:expr, $field:expr) => {{
        let val = $value;
        if val != 0 {
            Ok(())
        } else {
            Err($crate::PipeErr::InvalidValue {
                field: $field,
                value: 0,
            })
        }
    }};
}
