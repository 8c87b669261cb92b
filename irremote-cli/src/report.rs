//! Plain-text rendering of key tables, frames and simulation runs.

use irremote_core::board::BoardConfig;
use irremote_core::frame::Frame;
use irremote_core::keytab::KeyIndex;
use irremote_core::sim::{Event, SimBoard, TraceEntry};
use irremote_core::transmit::{segments, Segment};
use irremote_core::Outcome;

/// One row per key: index, position code, row, column, command.
pub fn key_table(board: &BoardConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!("Board {}: {} rows x {} columns\n", board.name, board.rows, board.columns));
    out.push_str("key  code  row  col  cmd\n");

    for key in KeyIndex::all() {
        let code = key.position();
        let note = if board.can_scan(code) { "" } else { "  (not wired)" };
        out.push_str(&format!(
            "{:>3}  {}  {:>3}  {:>3}  0x{:02X}{}\n",
            key.get(),
            code,
            code.row(),
            column_number(code.columns()),
            key.command(),
            note,
        ));
    }
    out
}

/// Index of the single set bit, or `?` for zero or several bits.
fn column_number(columns: u8) -> String {
    if columns.count_ones() == 1 {
        columns.trailing_zeros().to_string()
    } else {
        "?".to_string()
    }
}

/// Fields, bits and segment timings of one frame.
pub fn frame_breakdown(frame: Frame) -> String {
    let mut out = String::new();
    out.push_str(&format!("word     0x{:04X}  {}\n", frame.word(), frame));
    out.push_str(&format!("address  {}\n", frame.address()));
    out.push_str(&format!("command  0x{:02X}\n", frame.command()));
    out.push_str(&format!("toggle   {}\n", frame.toggle() as u8));
    out.push('\n');

    let mut total = 0u32;
    for (i, (bit, segs)) in frame.bits().zip(segments(frame).collect::<Vec<_>>().chunks(2)).enumerate() {
        let parts: Vec<String> = segs.iter().map(|s| segment_label(*s)).collect();
        total += segs.iter().map(|s| s.duration_us()).sum::<u32>();
        out.push_str(&format!("bit {:>2} = {}  {}\n", i, bit as u8, parts.join(" + ")));
    }
    out.push_str(&format!("\non-air {} us\n", total));
    out
}

fn segment_label(segment: Segment) -> String {
    match segment {
        Segment::Mark(cycles) => format!("mark {} cycles ({} us)", cycles, segment.duration_us()),
        Segment::Space(micros) => format!("space {} us", micros),
    }
}

/// One line per press cycle.
pub fn cycle_line(n: usize, outcome: &Outcome, finished_us: u64) -> String {
    let what = match outcome {
        Outcome::NoKey => "no key".to_string(),
        Outcome::NoMatch(code) => format!("no match for {}", code),
        Outcome::Sent { key, frame, frames } => format!(
            "key {} -> 0x{:04X} (addr {}, cmd 0x{:02X}, toggle {}) x{}",
            key,
            frame.word(),
            frame.address(),
            frame.command(),
            frame.toggle() as u8,
            frames
        ),
    };
    format!("press {:>2}: {:<60} done at {}\n", n, what, millis(finished_us))
}

/// Trace of everything the simulated board did.
pub fn trace(board: &SimBoard) -> String {
    let mut out = String::new();
    for entry in board.trace() {
        out.push_str(&trace_line(entry));
    }
    out
}

fn trace_line(entry: &TraceEntry) -> String {
    let what = match entry.event {
        Event::KeyWake => "key wake".to_string(),
        Event::Sleep(us) => format!("sleep {} us", us),
        Event::Segment(segment) => segment_label(segment),
        Event::CarrierStop => "carrier stop".to_string(),
    };
    format!("{:>12}  {}\n", millis(entry.at_us), what)
}

fn millis(us: u64) -> String {
    format!("{}.{:03} ms", us / 1000, us % 1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use irremote_core::board::{DIP_SELECT, FIXED_ADDRESS};

    #[test]
    fn test_key_table_marks_unwired_keys() {
        let full = key_table(&DIP_SELECT);
        assert!(!full.contains("not wired"));

        let fixed = key_table(&FIXED_ADDRESS);
        assert_eq!(fixed.matches("not wired").count(), 6);
        assert!(fixed.contains(" 18  0x80    0    3  0x31  (not wired)"));
    }

    #[test]
    fn test_frame_breakdown() {
        let text = frame_breakdown(Frame::new(24, 0x01, false));
        assert!(text.starts_with("word     0x3601  11011000000001\n"));
        assert!(text.contains("bit  0 = 1  space 780 us + mark 32 cycles (800 us)"));
        assert!(text.contains("bit  2 = 0  mark 35 cycles (875 us) + space 765 us"));
        assert_eq!(text.matches("bit ").count(), 14);
        assert!(text.ends_with("on-air 22660 us\n"));
    }

    #[test]
    fn test_millis() {
        assert_eq!(millis(151_660), "151.660 ms");
        assert_eq!(millis(7), "0.007 ms");
    }
}
