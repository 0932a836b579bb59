// vim: set ai et ts=4 sw=4 sts=4:
use std::fmt;
use std::os::unix::io::AsRawFd;
use std::time::Duration;
use ansi_term::ANSIString;

pub fn maybe_color(s: &ANSIString, emit_color: bool) -> String {
    match emit_color {
        true  => s.to_string(),
        false => (**s).to_string(), // deref once to get ANSIString, once more to get underlying str
    }
}
pub fn ralign(s: &str, width: usize) -> String {
    if s.len() >= width {
        return String::from(s);
    }
    format!("{}{}", " ".repeat(width-s.len()), s)
}
pub fn lalign_colored(s: &ANSIString, width: usize, emit_color: bool)
    -> String
{
    let visual_len = s.len(); // ANSIString.len() returns length WITHOUT escape sequences
    if visual_len >= width {
        return maybe_color(s, emit_color);
    }
    format!("{}{}", maybe_color(s, emit_color), " ".repeat(width-visual_len))
}
pub fn ralign_joined_coloreds(strs: &Vec<ANSIString>, width: usize, emit_color: bool)
    -> String
{
    let mut visual_len: usize = strs.iter().map(|ansi_str| ansi_str.len()).sum(); // ANSIString.len() returns length WITHOUT escape sequences
    visual_len += strs.len().saturating_sub(1); // count the spaces that .join(" ") will add; lines without clues have no parts

    let joined_colored = strs.iter()
                             .map(|astr| maybe_color(astr, emit_color))
                             .collect::<Vec<_>>()
                             .join(" ");
    if visual_len >= width {
        return joined_colored;
    }
    format!("{}{}", " ".repeat(width-visual_len), joined_colored)
}

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Direction {
    Horizontal,
    Vertical,
}
impl fmt::Display for Direction {
    fn fmt(&self,
           f: &mut fmt::Formatter) -> fmt::Result
    {
        write!(f, "{}", match self {
            Direction::Horizontal => "Horizontal",
            Direction::Vertical   => "Vertical",
        })
    }
}

pub fn is_a_tty<T: AsRawFd>(handle: T) -> bool {
	extern crate libc;
	let fd = handle.as_raw_fd();
    unsafe { libc::isatty(fd) != 0 }
}

// durations in log summaries; seconds alone get unreadable past a few minutes
pub fn human_duration(duration: Duration) -> String {
    let total = duration.as_secs_f64();
    if total < 10.0 {
        if total < 0.01 {
            return format!("{:.3} ms", total * 1000.0);
        }
        return format!("{:.3} secs", total);
    }

    let units: [(&str, u64); 5] = [("week", 604800), ("day", 86400), ("hour", 3600), ("min", 60), ("sec", 1)];
    let mut remainder = duration.as_secs();
    let mut parts = Vec::<String>::new();
    for (name, size) in units.iter() {
        let amount = remainder / size;
        remainder %= size;
        if amount > 0 {
            parts.push(format!("{} {}{}", amount, name, if amount == 1 { "" } else { "s" }));
        }
    }
    parts.join(", ")
}
