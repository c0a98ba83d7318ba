//! Date/time/frame/cycle counters (`spec.md` §4.7).

use crate::bus::PortSlave;
use crate::word::Word;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
enum Port {
    CurrentDate = 0,
    CurrentTime = 1,
    FrameCounter = 2,
    CycleCounter = 3,
}

const LAST_PORT: u32 = Port::CycleCounter as u32;

pub struct Timer {
    /// `year << 16 | day_of_year`.
    current_date: i32,
    /// `hours*3600 + minutes*60 + seconds`.
    current_time: i32,
    frame_counter: i32,
    cycle_counter: i32,
}

impl Timer {
    pub fn new() -> Self {
        Timer {
            current_date: 0,
            current_time: 0,
            frame_counter: 0,
            cycle_counter: 0,
        }
    }

    /// One CPU cycle elapsed.
    pub fn tick(&mut self) {
        self.cycle_counter += 1;
    }

    /// A new frame has begun.
    pub fn change_frame(&mut self) {
        self.frame_counter += 1;
        self.cycle_counter = 0;
    }

    pub fn cycle_counter(&self) -> i32 {
        self.cycle_counter
    }

    pub fn frame_counter(&self) -> i32 {
        self.frame_counter
    }

    /// Snapshot date/time from the host wall clock, called on reset.
    pub fn set_current_date(&mut self, year: i32, day_of_year: i32) {
        self.current_date = (year << 16) | (day_of_year & 0xFFFF);
    }

    pub fn set_current_time(&mut self, hours: i32, minutes: i32, seconds: i32) {
        self.current_time = hours * 3600 + minutes * 60 + seconds;
    }

    pub fn reset(&mut self) {
        self.cycle_counter = 0;
        self.frame_counter = 0;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl PortSlave for Timer {
    fn read_port(&mut self, local_port: u32) -> Option<Word> {
        if local_port > LAST_PORT {
            return None;
        }

        let value = match local_port {
            0 => self.current_date,
            1 => self.current_time,
            2 => self.frame_counter,
            3 => self.cycle_counter,
            _ => unreachable!(),
        };

        Some(Word::from_integer(value))
    }

    fn write_port(&mut self, _local_port: u32, _value: Word) -> bool {
        // every timer port is read-only
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_and_change_frame_counters() {
        let mut timer = Timer::new();
        timer.tick();
        timer.tick();
        assert_eq!(timer.cycle_counter(), 2);

        timer.change_frame();
        assert_eq!(timer.frame_counter(), 1);
        assert_eq!(timer.cycle_counter(), 0);
    }

    #[test]
    fn date_and_time_packing() {
        let mut timer = Timer::new();
        timer.set_current_date(2026, 209);
        timer.set_current_time(13, 5, 9);

        assert_eq!(
            timer.read_port(Port::CurrentDate as u32).unwrap().integer(),
            (2026 << 16) | 209
        );
        assert_eq!(
            timer.read_port(Port::CurrentTime as u32).unwrap().integer(),
            13 * 3600 + 5 * 60 + 9
        );
    }

    #[test]
    fn ports_are_read_only() {
        let mut timer = Timer::new();
        assert!(!timer.write_port(Port::FrameCounter as u32, Word::from_integer(5)));
    }

    #[test]
    fn reset_clears_counters_but_not_date() {
        let mut timer = Timer::new();
        timer.set_current_date(2026, 1);
        timer.tick();
        timer.change_frame();
        timer.reset();
        assert_eq!(timer.cycle_counter(), 0);
        assert_eq!(timer.frame_counter(), 0);
        assert_eq!(timer.read_port(0).unwrap().integer(), (2026 << 16) | 1);
    }
}
