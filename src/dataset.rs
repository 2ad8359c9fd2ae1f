//! Labeled variant table and FASTA input, delta-score output
//!
//! The calibration input is a tab-separated table with a header line of
//! `chrom pos ref alt class` columns, where `class` is `LOF`, `FUNC`, `INT`
//! or `FUNC/INT`. Malformed rows abort the whole run: a silently reduced
//! calibration set would produce a misleading threshold.

use crate::utils::is_gzipped;
use crate::{Variant, VariantClass, VescoreError, VescoreResult};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// A calibration example: a variant with its functional class label
#[derive(Debug, Clone)]
pub struct LabeledVariant {
    pub variant: Variant,
    pub class: VariantClass,
}

fn open_maybe_gzipped<P: AsRef<Path>>(path: P) -> VescoreResult<Box<dyn BufRead>> {
    let file = File::open(&path)
        .map_err(|_| VescoreError::FileNotFound(path.as_ref().to_string_lossy().to_string()))?;

    if is_gzipped(&path)? {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn parse_base(field: &str, row: usize, column: &str) -> VescoreResult<char> {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(base), None) if Variant::is_valid_base(base) => Ok(base),
        _ => Err(VescoreError::InvalidVariant(format!(
            "Row {}: {} must be a single base in ACGT, got '{}'",
            row, column, field
        ))),
    }
}

/// Read a labeled SNV table (TSV, optionally gzipped).
///
/// Expects `chrom`, `pos`, `ref`, `alt` and `class` columns. Every row must
/// parse; the first malformed row fails the whole read.
pub fn read_labeled_variants<P: AsRef<Path>>(path: P) -> VescoreResult<Vec<LabeledVariant>> {
    let reader = open_maybe_gzipped(&path)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| -> VescoreResult<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| {
                VescoreError::InvalidVariant(format!("Missing required column '{}'", name))
            })
    };
    let chrom_col = column("chrom")?;
    let pos_col = column("pos")?;
    let ref_col = column("ref")?;
    let alt_col = column("alt")?;
    let class_col = column("class")?;

    let mut variants = Vec::new();
    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = i + 2; // 1-based, after the header line

        let chrom = record
            .get(chrom_col)
            .ok_or_else(|| VescoreError::InvalidVariant(format!("Row {}: missing chrom", row)))?
            .to_string();
        let pos_field = record
            .get(pos_col)
            .ok_or_else(|| VescoreError::InvalidVariant(format!("Row {}: missing pos", row)))?;
        let pos = pos_field.parse::<u32>().map_err(|_| {
            VescoreError::InvalidVariant(format!("Row {}: invalid position '{}'", row, pos_field))
        })?;
        if pos < 1 {
            return Err(VescoreError::InvalidVariant(format!(
                "Row {}: position must be >= 1",
                row
            )));
        }

        let ref_base = parse_base(record.get(ref_col).unwrap_or(""), row, "ref")?;
        let alt_base = parse_base(record.get(alt_col).unwrap_or(""), row, "alt")?;
        let class: VariantClass = record
            .get(class_col)
            .ok_or_else(|| VescoreError::InvalidVariant(format!("Row {}: missing class", row)))?
            .parse()?;

        variants.push(LabeledVariant {
            variant: Variant::new(chrom, pos, Some(ref_base), alt_base),
            class,
        });
    }

    Ok(variants)
}

/// Read the first record of a FASTA file (optionally gzipped), upper-cased.
pub fn read_fasta_sequence<P: AsRef<Path>>(path: P) -> VescoreResult<String> {
    let reader = open_maybe_gzipped(&path)?;

    let mut sequence = String::new();
    let mut in_first_record = false;
    for line in reader.lines() {
        let line = line?;
        if let Some(rest) = line.strip_prefix('>') {
            if in_first_record {
                break;
            }
            in_first_record = true;
            log::info!("Reading FASTA record: {}", rest.trim());
            continue;
        }
        if !in_first_record {
            return Err(VescoreError::InvalidVariant(
                "FASTA file does not start with a '>' header line".to_string(),
            ));
        }
        sequence.push_str(line.trim().to_uppercase().as_str());
    }

    if sequence.is_empty() {
        return Err(VescoreError::InvalidVariant(
            "FASTA file contains no sequence data".to_string(),
        ));
    }

    Ok(sequence)
}

/// Write per-variant delta scores to a TSV file (gzipped when the path ends
/// in `.gz`).
pub fn write_delta_scores<P: AsRef<Path>>(
    variants: &[LabeledVariant],
    delta_scores: &[f64],
    output_path: P,
) -> VescoreResult<()> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let output_path = output_path.as_ref();
    let file = File::create(output_path)?;
    let mut writer: Box<dyn Write> =
        if output_path.extension().and_then(|s| s.to_str()) == Some("gz") {
            Box::new(GzEncoder::new(file, Compression::default()))
        } else {
            Box::new(file)
        };

    writeln!(writer, "chrom\tpos\tref\talt\tclass\tdelta_score")?;
    for (labeled, delta) in variants.iter().zip(delta_scores) {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            labeled.variant.chrom,
            labeled.variant.pos,
            labeled.variant.ref_base.unwrap_or('N'),
            labeled.variant.alt_base,
            labeled.class,
            delta,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_labeled_variants() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chrom\tpos\tref\talt\tclass").unwrap();
        writeln!(file, "chr17\t41276135\tT\tG\tLOF").unwrap();
        writeln!(file, "chr17\t41276140\tA\tC\tFUNC/INT").unwrap();

        let variants = read_labeled_variants(file.path()).unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].variant.chrom, "chr17");
        assert_eq!(variants[0].variant.pos, 41276135);
        assert_eq!(variants[0].variant.ref_base, Some('T'));
        assert_eq!(variants[0].variant.alt_base, 'G');
        assert_eq!(variants[0].class, VariantClass::LossOfFunction);
        assert_eq!(variants[1].class, VariantClass::Functional);
    }

    #[test]
    fn test_malformed_row_aborts_read() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chrom\tpos\tref\talt\tclass").unwrap();
        writeln!(file, "chr17\t41276135\tT\tG\tLOF").unwrap();
        writeln!(file, "chr17\tnot_a_number\tT\tG\tLOF").unwrap();

        assert!(matches!(
            read_labeled_variants(file.path()),
            Err(VescoreError::InvalidVariant(_))
        ));
    }

    #[test]
    fn test_multi_base_alt_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chrom\tpos\tref\talt\tclass").unwrap();
        writeln!(file, "chr17\t100\tT\tGA\tLOF").unwrap();

        assert!(read_labeled_variants(file.path()).is_err());
    }

    #[test]
    fn test_missing_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chrom\tpos\tref\talt").unwrap();
        writeln!(file, "chr17\t100\tT\tG").unwrap();

        assert!(matches!(
            read_labeled_variants(file.path()),
            Err(VescoreError::InvalidVariant(_))
        ));
    }

    #[test]
    fn test_read_fasta_sequence() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, ">chr17 test sequence").unwrap();
        writeln!(file, "acgtACGT").unwrap();
        writeln!(file, "TTTT").unwrap();

        let sequence = read_fasta_sequence(file.path()).unwrap();
        assert_eq!(sequence, "ACGTACGTTTTT");
    }

    #[test]
    fn test_read_fasta_stops_at_second_record() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, ">first").unwrap();
        writeln!(file, "AAAA").unwrap();
        writeln!(file, ">second").unwrap();
        writeln!(file, "CCCC").unwrap();

        assert_eq!(read_fasta_sequence(file.path()).unwrap(), "AAAA");
    }

    #[test]
    fn test_read_gzipped_fasta() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let file = NamedTempFile::new().unwrap();
        {
            let mut encoder = GzEncoder::new(
                File::create(file.path()).unwrap(),
                Compression::default(),
            );
            writeln!(encoder, ">chr17").unwrap();
            writeln!(encoder, "acgtacgt").unwrap();
            encoder.finish().unwrap();
        }

        assert_eq!(read_fasta_sequence(file.path()).unwrap(), "ACGTACGT");
    }

    #[test]
    fn test_write_delta_scores_roundtrip() {
        let variants = vec![
            LabeledVariant {
                variant: Variant::new("chr17".to_string(), 100, Some('T'), 'G'),
                class: VariantClass::LossOfFunction,
            },
            LabeledVariant {
                variant: Variant::new("chr17".to_string(), 200, Some('A'), 'C'),
                class: VariantClass::Functional,
            },
        ];
        let deltas = [-0.002, 0.0005];

        let file = NamedTempFile::new().unwrap();
        write_delta_scores(&variants, &deltas, file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "chrom\tpos\tref\talt\tclass\tdelta_score");
        assert_eq!(lines[1], "chr17\t100\tT\tG\tLOF\t-0.002");
        assert_eq!(lines[2], "chr17\t200\tA\tC\tFUNC/INT\t0.0005");
    }
}
