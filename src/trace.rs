use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

use log::debug;

/// Operation code of one trace entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryOp {
    /// Instruction fetch; carried in traces but never simulated.
    Instruction,
    Load,
    Store,
    /// Load immediately followed by a store to the same address.
    Modify,
}

impl MemoryOp {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(MemoryOp::Instruction),
            'L' => Some(MemoryOp::Load),
            'S' => Some(MemoryOp::Store),
            'M' => Some(MemoryOp::Modify),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            MemoryOp::Instruction => 'I',
            MemoryOp::Load => 'L',
            MemoryOp::Store => 'S',
            MemoryOp::Modify => 'M',
        }
    }
}

impl fmt::Display for MemoryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One `(op, address, size)` trace record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    pub op: MemoryOp,
    pub addr: u64,
    /// Access width in bytes; carried for the echo but never classified.
    pub size: u32,
}

impl TraceEntry {
    /// Parses one trace line of the form `<op> <hex-address>,<size>`.
    ///
    /// The address is hexadecimal without an `0x` prefix and the size is
    /// decimal. Whitespace around the whole line is tolerated, at least one
    /// whitespace character must separate the op from the address, and none
    /// may surround the comma. Anything else is no entry at all.
    pub fn parse(line: &str) -> Option<Self> {
        let text = line.trim();
        let mut chars = text.chars();
        let op = MemoryOp::from_char(chars.next()?)?;
        let rest = chars.as_str();
        let body = rest.trim_start();
        if body.len() == rest.len() {
            return None;
        }
        let (addr_text, size_text) = body.split_once(',')?;
        let addr = u64::from_str_radix(addr_text, 16).ok()?;
        let size = size_text.parse().ok()?;
        Some(Self { op, addr, size })
    }
}

/// Line-oriented trace reader.
///
/// Yields entries in file order and fuses itself at the first line that is
/// not a well-formed entry, at end of input, or on a read error. A malformed
/// line is an end-of-trace marker, not an error.
#[derive(Debug)]
pub struct TraceReader<R> {
    lines: Lines<R>,
    line_no: usize,
    done: bool,
}

impl TraceReader<BufReader<File>> {
    /// Opens a trace file; fails only if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = TraceEntry;

    fn next(&mut self) -> Option<TraceEntry> {
        if self.done {
            return None;
        }
        self.line_no += 1;
        match self.lines.next() {
            Some(Ok(line)) => match TraceEntry::parse(&line) {
                Some(entry) => Some(entry),
                None => {
                    debug!("trace stopped at line {}: unrecognized entry", self.line_no);
                    self.done = true;
                    None
                }
            },
            Some(Err(err)) => {
                debug!("trace read failed at line {}: {err}", self.line_no);
                self.done = true;
                None
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_operation() {
        assert_eq!(
            TraceEntry::parse("L 10,1"),
            Some(TraceEntry {
                op: MemoryOp::Load,
                addr: 0x10,
                size: 1
            })
        );
        assert_eq!(
            TraceEntry::parse("S 7ff0005c8,8"),
            Some(TraceEntry {
                op: MemoryOp::Store,
                addr: 0x7ff0005c8,
                size: 8
            })
        );
        assert_eq!(
            TraceEntry::parse("M 20,4").map(|e| e.op),
            Some(MemoryOp::Modify)
        );
        assert_eq!(
            TraceEntry::parse("I 400540,3").map(|e| e.op),
            Some(MemoryOp::Instruction)
        );
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        // Valgrind indents data lines with a leading space.
        let entry = TraceEntry::parse(" L 04f6b868,8\n").unwrap();
        assert_eq!(entry.addr, 0x04f6b868);
        assert_eq!(entry.size, 8);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(TraceEntry::parse(""), None);
        assert_eq!(TraceEntry::parse("X 10,1"), None);
        assert_eq!(TraceEntry::parse("L10,1"), None);
        assert_eq!(TraceEntry::parse("L 10"), None);
        assert_eq!(TraceEntry::parse("L zz,1"), None);
        assert_eq!(TraceEntry::parse("L 10 ,1"), None);
        assert_eq!(TraceEntry::parse("L 10,"), None);
        assert_eq!(TraceEntry::parse("L 10,1 trailing"), None);
    }

    #[test]
    fn reader_yields_entries_in_order() {
        let input = " L 10,1\n M 20,4\n S 18,8\n";
        let ops: Vec<_> = TraceReader::new(input.as_bytes()).map(|e| e.op).collect();
        assert_eq!(
            ops,
            vec![MemoryOp::Load, MemoryOp::Modify, MemoryOp::Store]
        );
    }

    #[test]
    fn reader_stops_at_first_malformed_line() {
        let input = " L 10,1\n S 18,4\nnot a trace line\n L 20,1\n";
        let entries: Vec<_> = TraceReader::new(input.as_bytes()).collect();
        assert_eq!(entries.len(), 2, "entries after the bad line are dropped");
        assert_eq!(entries[1].addr, 0x18);
    }

    #[test]
    fn reader_handles_empty_input() {
        assert_eq!(TraceReader::new(&b""[..]).count(), 0);
    }

    #[test]
    fn reader_stays_fused() {
        let mut reader = TraceReader::new(&b" L 10,1\nend\n L 20,1\n"[..]);
        assert!(reader.next().is_some());
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
    }
}
