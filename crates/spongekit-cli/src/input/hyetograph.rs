use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::io::Read;
use std::str::FromStr;

use spongekit_core::hydrology::storm::StormEvent;

use crate::input::file::resolve_path;

const MINUTE_HEADERS: [&str; 4] = ["minute", "minutes", "time_min", "t_min"];
const INTENSITY_HEADERS: [&str; 4] = ["mm_per_min", "intensity", "intensity_mm_per_min", "mm_min"];

/// Read a hyetograph CSV and build the storm it describes.
pub fn read_storm(path: &str) -> Result<StormEvent, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let file = std::fs::File::open(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let rows = parse_rows(file)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(StormEvent::from_intensity_series(&rows)?)
}

/// Parse `(minute, mm_per_min)` rows. Header names are matched
/// case-insensitively; blank intensities count as zero.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<(u32, Decimal)>, Box<dyn std::error::Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let find = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

    let columns = (find(&MINUTE_HEADERS[..]), find(&INTENSITY_HEADERS[..]));
    let (minute_col, intensity_col) = match columns {
        (Some(m), Some(i)) => (m, i),
        _ => {
            return Err(format!(
                "Hyetograph must include a minute column ({}) and an intensity column ({})",
                MINUTE_HEADERS.join("/"),
                INTENSITY_HEADERS.join("/")
            )
            .into())
        }
    };

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let minute_raw = record.get(minute_col).unwrap_or_default();
        let minute = Decimal::from_str(minute_raw)
            .ok()
            .filter(|m| m.fract().is_zero())
            .and_then(|m| m.to_u32())
            .ok_or_else(|| format!("Row {}: invalid minute '{}'", line + 1, minute_raw))?;

        let intensity_raw = record.get(intensity_col).unwrap_or_default();
        let intensity = if intensity_raw.is_empty() {
            Decimal::ZERO
        } else {
            Decimal::from_str(intensity_raw)
                .map_err(|_| format!("Row {}: invalid intensity '{}'", line + 1, intensity_raw))?
        };
        rows.push((minute, intensity));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_standard_headers() {
        let csv = "minutes,mm_per_min\n0,0.5\n5,1.5\n10,\n";
        let rows = parse_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows, vec![(0, dec!(0.5)), (5, dec!(1.5)), (10, Decimal::ZERO)]);

        let storm = StormEvent::from_intensity_series(&rows).unwrap();
        assert_eq!(storm.total_depth(), dec!(10));
    }

    #[test]
    fn test_parse_header_variants() {
        let csv = " T_Min , Intensity \n1,2\n2,3\n";
        let rows = parse_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows, vec![(1, dec!(2)), (2, dec!(3))]);
    }

    #[test]
    fn test_missing_columns_named_in_error() {
        let err = parse_rows("time,rain\n0,1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("mm_per_min"));
    }

    #[test]
    fn test_fractional_minute_rejected() {
        assert!(parse_rows("minute,mm_min\n0.5,1\n".as_bytes()).is_err());
    }
}
