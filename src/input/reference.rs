use std::io::BufRead;
use std::path::Path;

use crate::input::compress::open_maybe_gz;
use crate::input::{Header, InputError};
use crate::reference::{RawReferenceRow, RawValue};

fn is_json(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    name.ends_with(".json") || name.ends_with(".json.gz")
}

/// Load raw reference rows from a TSV (optionally gzipped) or a JSON array.
/// Nothing is validated here beyond the file shape.
pub fn load_reference_rows(path: &Path) -> Result<Vec<RawReferenceRow>, InputError> {
    let reader = open_maybe_gz(path)?;
    let rows = if is_json(path) {
        serde_json::from_reader(reader).map_err(|source| InputError::Json {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        parse_reference_tsv(path, reader)?
    };
    tracing::info!(path = %path.display(), rows = rows.len(), "loaded reference rows");
    Ok(rows)
}

struct Columns {
    gender: usize,
    age: usize,
    chart: Option<usize>,
    l: usize,
    m: usize,
    s: usize,
    sd: [Option<usize>; 9],
}

const SD_ALIASES: [&[&str]; 9] = [
    &["sd0"],
    &["sd1neg"],
    &["sd1", "sd1pos"],
    &["sd2neg"],
    &["sd2", "sd2pos"],
    &["sd3neg"],
    &["sd3", "sd3pos"],
    &["sd4neg"],
    &["sd4", "sd4pos"],
];

fn parse_reference_tsv(
    path: &Path,
    mut reader: Box<dyn BufRead>,
) -> Result<Vec<RawReferenceRow>, InputError> {
    let mut buf = String::new();
    if reader.read_line(&mut buf)? == 0 {
        return Err(InputError::Parse {
            path: path.to_path_buf(),
            message: "reference file is empty".to_string(),
        });
    }
    let header = Header::parse(&buf);
    let mut sd = [None; 9];
    for (slot, aliases) in sd.iter_mut().zip(SD_ALIASES) {
        *slot = header.find(aliases);
    }
    let cols = Columns {
        gender: header.require(path, "sex", &["sex", "gender"])?,
        age: header.require(path, "age_days", &["age_days", "agedays", "age", "day"])?,
        chart: header.find(&["chart", "chart_type", "charttype"]),
        l: header.require(path, "l", &["l"])?,
        m: header.require(path, "m", &["m"])?,
        s: header.require(path, "s", &["s"])?,
        sd,
    };

    let mut rows = Vec::new();
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| fields.get(i))
                .map(|s| RawValue::text(s))
                .unwrap_or(RawValue::Missing)
        };
        rows.push(RawReferenceRow {
            gender: cell(Some(cols.gender)),
            chart_type: cell(cols.chart),
            age_days: cell(Some(cols.age)),
            l: cell(Some(cols.l)),
            m: cell(Some(cols.m)),
            s: cell(Some(cols.s)),
            sd0: cell(cols.sd[0]),
            sd1neg: cell(cols.sd[1]),
            sd1pos: cell(cols.sd[2]),
            sd2neg: cell(cols.sd[3]),
            sd2pos: cell(cols.sd[4]),
            sd3neg: cell(cols.sd[5]),
            sd3pos: cell(cols.sd[6]),
            sd4neg: cell(cols.sd[7]),
            sd4pos: cell(cols.sd[8]),
        });
    }
    Ok(rows)
}
