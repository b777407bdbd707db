//! Size formatting helpers shared by the viewers

use num_format::{Locale, ToFormattedString};

/// Convert a size in MiB to human-readable format (e.g., "1.50 GiB")
pub fn format_size(mib: u64, add_exact: bool) -> String {
    let (val, steps) = scale(mib);

    let unit = match steps {
        0 => "MiB",
        1 => "GiB",
        2 => "TiB",
        3 => "PiB",
        _ => "EiB",
    };

    if add_exact {
        let exact = mib.to_formatted_string(&Locale::en);
        format!("{:.2} {} ({} MiB)", val, unit, exact)
    } else {
        format!("{:.2} {}", val, unit)
    }
}

/// Get numeric value that would be displayed in format_size
pub fn get_numeric(mib: u64) -> f64 {
    scale(mib).0
}

fn scale(mib: u64) -> (f64, u32) {
    let mut steps = 0;
    let mut val = mib as f64;

    while val >= 1024. && steps < 4 {
        val /= 1024.;
        steps += 1;
    }

    (val, steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_small_sizes_in_mib() {
        assert_eq!(format_size(512, false), "512.00 MiB");
    }

    #[test]
    fn formats_large_sizes_with_exact_value() {
        assert_eq!(format_size(1536, true), "1.50 GiB (1,536 MiB)");
        assert_eq!(get_numeric(3 * 1024 * 1024), 3.0);
    }
}
