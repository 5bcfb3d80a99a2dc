//! Per-deck JSONL log and the final `results.json` record.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use penney_core::PenneyError;
use penney_core::game::aggregate::{Aggregate, Probabilities};
use penney_core::game::evaluator::evaluate;
use penney_core::game::serialization::{DeckRecord, ResultRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{context} {path:?}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record on line {line} of {path:?}: {source}")]
    Json {
        line: usize,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid deck on line {line} of {path:?}: {source}")]
    Deck {
        line: usize,
        path: PathBuf,
        #[source]
        source: PenneyError,
    },
    #[error("malformed outcomes on line {line} of {path:?}: {source}")]
    Outcomes {
        line: usize,
        path: PathBuf,
        #[source]
        source: PenneyError,
    },
    #[error("stored outcomes for deck {index} (line {line}) do not match a fresh evaluation")]
    Mismatch { line: usize, index: u64 },
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Streams one JSON line per evaluated deck.
pub struct DeckLogWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    rows: usize,
}

impl DeckLogWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        ensure_parent(&path)?;
        let file = File::create(&path).map_err(|source| StorageError::Io {
            context: "creating deck log",
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            rows: 0,
        })
    }

    pub fn append(&mut self, record: &DeckRecord) -> Result<(), StorageError> {
        serde_json::to_writer(&mut self.writer, record).map_err(|source| {
            StorageError::Serialize {
                what: "deck record",
                source,
            }
        })?;
        self.writer
            .write_all(b"\n")
            .map_err(|source| self.io_error("writing deck log", source))?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush buffered rows and return how many were written.
    pub fn finish(mut self) -> Result<usize, StorageError> {
        self.writer
            .flush()
            .map_err(|source| self.io_error("flushing deck log", source))?;
        Ok(self.rows)
    }

    fn io_error(&self, context: &'static str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            context,
            path: self.path.clone(),
            source,
        }
    }
}

/// Streams records out of a deck log one line at a time, skipping blank lines.
///
/// Items carry the 1-based line number alongside the record.
pub struct DeckLogReader {
    lines: std::iter::Enumerate<Lines<BufReader<File>>>,
    path: PathBuf,
}

impl DeckLogReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| StorageError::Io {
            context: "opening deck log",
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            lines: BufReader::new(file).lines().enumerate(),
            path,
        })
    }
}

impl Iterator for DeckLogReader {
    type Item = Result<(usize, DeckRecord), StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, line) in self.lines.by_ref() {
            let line = match line {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(StorageError::Io {
                        context: "reading deck log",
                        path: self.path.clone(),
                        source,
                    }));
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let parsed = serde_json::from_str(&line)
                .map(|record| (idx + 1, record))
                .map_err(|source| StorageError::Json {
                    line: idx + 1,
                    path: self.path.clone(),
                    source,
                });
            return Some(parsed);
        }
        None
    }
}

/// Fold a stored deck log into a fresh aggregate without holding it in memory.
///
/// Every record's matrices must be well-formed 0/1 outcomes. With `verify`
/// set, every stored deck is also re-evaluated and its outcomes must match the
/// stored matrices exactly.
pub fn aggregate_deck_log(path: impl AsRef<Path>, verify: bool) -> Result<Aggregate, StorageError> {
    let path = path.as_ref();
    let mut aggregate = Aggregate::new();
    for entry in DeckLogReader::open(path)? {
        let (line, record) = entry?;
        let outcomes = record.outcomes();
        outcomes.validate().map_err(|source| StorageError::Outcomes {
            line,
            path: path.to_path_buf(),
            source,
        })?;
        if verify {
            let deck = record.deck().map_err(|source| StorageError::Deck {
                line,
                path: path.to_path_buf(),
                source,
            })?;
            if evaluate(&deck) != outcomes {
                return Err(StorageError::Mismatch {
                    line,
                    index: record.index,
                });
            }
        }
        aggregate.fold(&outcomes);
    }
    Ok(aggregate)
}

pub fn write_results(path: impl AsRef<Path>, probabilities: &Probabilities) -> Result<(), StorageError> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let json = ResultRecord::to_json(probabilities).map_err(|source| StorageError::Serialize {
        what: "result record",
        source,
    })?;
    fs::write(path, json).map_err(|source| StorageError::Io {
        context: "writing results",
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_results(path: impl AsRef<Path>) -> Result<ResultRecord, StorageError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| StorageError::Io {
        context: "reading results",
        path: path.to_path_buf(),
        source,
    })?;
    ResultRecord::from_json(&json).map_err(|source| StorageError::Json {
        line: 1,
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            context: "creating directory",
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use penney_core::model::deck::Deck;
    use tempfile::tempdir;

    fn write_log(path: &Path, seeds: &[u64]) -> Aggregate {
        let mut writer = DeckLogWriter::create(path).expect("create log");
        let mut aggregate = Aggregate::new();
        for (idx, &seed) in seeds.iter().enumerate() {
            let deck = Deck::shuffled_with_seed(seed);
            let outcomes = evaluate(&deck);
            writer
                .append(&DeckRecord::capture(idx as u64, seed, &deck, &outcomes))
                .expect("append");
            aggregate.fold(&outcomes);
        }
        assert_eq!(writer.rows(), seeds.len());
        assert_eq!(writer.finish().expect("flush"), seeds.len());
        aggregate
    }

    #[test]
    fn stored_log_reaggregates_to_the_same_totals() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested/decks.jsonl");
        let expected = write_log(&path, &[1, 2, 3]);

        let records: Vec<(usize, DeckRecord)> = DeckLogReader::open(&path)
            .expect("open")
            .collect::<Result<_, _>>()
            .expect("read");
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].0, 3);
        assert_eq!(records[2].1.seed, 3);

        let reloaded = aggregate_deck_log(&path, true).expect("aggregate");
        assert_eq!(reloaded, expected);
    }

    fn first_record(path: &Path) -> DeckRecord {
        let mut reader = DeckLogReader::open(path).expect("open");
        reader.next().expect("one record").expect("parse").1
    }

    #[test]
    fn tampered_outcomes_fail_verification() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("decks.jsonl");
        write_log(&path, &[4]);

        // Flip a decided cell so the record stays well-formed but wrong.
        let mut record = first_record(&path);
        let (pair, _) = record
            .card_ties
            .cells()
            .find(|&(pair, tie)| !pair.is_diagonal() && tie == 0)
            .expect("a decided cell");
        let (row, column) = (pair.first.index(), pair.second.index());
        let mut cards = *record.cards.rows();
        cards[row][column] ^= 1;
        record.cards = penney_core::model::matrix::Matrix::from_rows(cards);
        fs::write(&path, serde_json::to_string(&record).expect("json")).expect("rewrite");

        assert!(aggregate_deck_log(&path, false).is_ok());
        assert!(matches!(
            aggregate_deck_log(&path, true),
            Err(StorageError::Mismatch { line: 1, index: 0 })
        ));
    }

    #[test]
    fn out_of_range_outcomes_are_rejected_without_verification() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("decks.jsonl");
        write_log(&path, &[4, 5]);

        let mut record = first_record(&path);
        let mut cards = *record.cards.rows();
        let mut ties = *record.card_ties.rows();
        cards[0][1] = 7;
        ties[0][1] = 1;
        record.cards = penney_core::model::matrix::Matrix::from_rows(cards);
        record.card_ties = penney_core::model::matrix::Matrix::from_rows(ties);
        let good = fs::read_to_string(&path).expect("read log");
        let second = good.lines().nth(1).expect("second row");
        let json = serde_json::to_string(&record).expect("json");
        fs::write(&path, format!("{second}\n{json}\n")).expect("rewrite");

        assert!(matches!(
            aggregate_deck_log(&path, false),
            Err(StorageError::Outcomes { line: 2, .. })
        ));
    }

    #[test]
    fn win_and_tie_in_one_cell_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("decks.jsonl");
        write_log(&path, &[6]);

        let mut record = first_record(&path);
        let mut wins = *record.tricks.rows();
        let mut ties = *record.trick_ties.rows();
        wins[3][6] = 1;
        ties[3][6] = 1;
        record.tricks = penney_core::model::matrix::Matrix::from_rows(wins);
        record.trick_ties = penney_core::model::matrix::Matrix::from_rows(ties);
        fs::write(&path, serde_json::to_string(&record).expect("json")).expect("rewrite");

        let err = aggregate_deck_log(&path, false).unwrap_err();
        assert!(matches!(err, StorageError::Outcomes { line: 1, .. }));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn malformed_line_reports_position() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("decks.jsonl");
        fs::write(&path, "\nnot json\n").expect("write");
        assert!(matches!(
            DeckLogReader::open(&path).expect("open").next(),
            Some(Err(StorageError::Json { line: 2, .. }))
        ));
        assert!(matches!(
            aggregate_deck_log(&path, false),
            Err(StorageError::Json { line: 2, .. })
        ));
    }

    #[test]
    fn results_round_trip_through_disk() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("out/results.json");
        let aggregate: Aggregate = [7u64, 8]
            .iter()
            .map(|&seed| evaluate(&Deck::shuffled_with_seed(seed)))
            .collect();
        let probabilities = aggregate.finalize().expect("finalize");

        write_results(&path, &probabilities).expect("write");
        let record = read_results(&path).expect("read");
        assert_eq!(record.n, 2);
        assert_eq!(record.restore(), probabilities);
    }
}
