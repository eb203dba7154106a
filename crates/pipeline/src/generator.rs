use tf_core::{CoreError, Item, Serial, MAX_SERIAL};
use tf_timing::RandomSource;

pub const DEFAULT_PALETTE: [&str; 4] = ["RED", "BLUE", "GREEN", "YELLOW"];

/// Hands out items with increasing serials and randomly picked colors.
#[derive(Debug, Clone)]
pub struct ItemGenerator {
    next_serial: Serial,
    palette: Vec<String>,
}

impl ItemGenerator {
    pub fn new() -> Self {
        Self::with_palette(DEFAULT_PALETTE)
    }

    /// Empty palettes fall back to the default colors.
    pub fn with_palette<I, S>(palette: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut palette: Vec<String> = palette.into_iter().map(Into::into).collect();
        if palette.is_empty() {
            palette = DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect();
        }
        Self { next_serial: 1, palette }
    }

    pub fn next_serial(&self) -> Serial {
        self.next_serial
    }

    pub fn next_item(&mut self, random: &mut dyn RandomSource) -> Result<Item, CoreError> {
        if self.next_serial > MAX_SERIAL {
            return Err(CoreError::InvalidSerial(self.next_serial));
        }
        let pick = (random.next_unit() * self.palette.len() as f64) as usize;
        let color = &self.palette[pick.min(self.palette.len() - 1)];
        let item = Item::try_new(self.next_serial, color)?;
        self.next_serial += 1;
        Ok(item)
    }
}

impl Default for ItemGenerator {
    fn default() -> Self {
        Self::new()
    }
}
