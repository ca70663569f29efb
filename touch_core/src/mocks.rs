//! Test and helper sensors for touch_core

/// A sensor that always errors on read; useful for exercising the stall
/// watchdog and error mapping.
pub struct NoopSensor;

impl touch_traits::TouchSensor for NoopSensor {
    fn width(&self) -> u8 {
        12
    }

    fn read_touched(&mut self) -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("noop sensor")))
    }
}

/// A sensor that returns a fixed sequence of masks, one per read, then
/// repeats the last one.
#[derive(Debug, Clone)]
pub struct SequenceSensor {
    width: u8,
    seq: Vec<u32>,
    idx: usize,
}

impl SequenceSensor {
    pub fn new(width: u8, seq: impl Into<Vec<u32>>) -> Self {
        Self {
            width,
            seq: seq.into(),
            idx: 0,
        }
    }
}

impl touch_traits::TouchSensor for SequenceSensor {
    fn width(&self) -> u8 {
        self.width
    }

    fn read_touched(&mut self) -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        let v = match self.seq.get(self.idx) {
            Some(v) => *v,
            None => self.seq.last().copied().unwrap_or(0),
        };
        self.idx = self.idx.saturating_add(1);
        Ok(v)
    }
}
