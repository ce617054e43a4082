// Palette - 256-entry color table for the indexed back buffer
//
// Two tables exist:
// - SystemPalette: the entries drawing code reads and writes. It outlives
//   surface teardown so colors survive a reinit.
// - Palette: the table bound to the back buffer and used by the blitter. It is
//   recreated with the surfaces and carries a version bumped on every install.

/// Number of entries in a palette
pub const PALETTE_SIZE: usize = 256;

/// One palette entry (red, green, blue and a flags byte)
///
/// The flags byte is never stored: reads and writes always clear it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PaletteEntry {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub flags: u8,
}

impl PaletteEntry {
    /// Create an entry with cleared flags
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            flags: 0,
        }
    }

    /// Copy of this entry with the flags byte cleared
    #[inline]
    pub const fn without_flags(self) -> Self {
        Self::rgb(self.red, self.green, self.blue)
    }

    /// Opaque RGBA bytes for this entry
    #[inline]
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.red, self.green, self.blue, 0xFF]
    }
}

/// Palette entries as seen by drawing code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPalette {
    entries: [PaletteEntry; PALETTE_SIZE],
}

impl SystemPalette {
    /// Create a palette with every entry black
    pub fn new() -> Self {
        Self {
            entries: [PaletteEntry::default(); PALETTE_SIZE],
        }
    }

    /// Grayscale ramp (entry i = (i, i, i))
    pub fn grayscale() -> Self {
        let mut palette = Self::new();
        for (i, entry) in palette.entries.iter_mut().enumerate() {
            *entry = PaletteEntry::rgb(i as u8, i as u8, i as u8);
        }
        palette
    }

    /// Copy the first `count` entries into `out`, clearing flags
    ///
    /// The copy is bounded by the palette size and by `out.len()`.
    ///
    /// # Returns
    /// Number of entries copied
    pub fn get_entries(&self, count: usize, out: &mut [PaletteEntry]) -> usize {
        let mut copied = 0;
        for (dst, src) in out.iter_mut().zip(self.entries.iter()).take(count) {
            *dst = src.without_flags();
            copied += 1;
        }
        copied
    }

    /// Store the first `count` entries of `entries`, clearing flags
    ///
    /// The copy is bounded by the palette size and by `entries.len()`.
    ///
    /// # Returns
    /// Number of entries stored
    pub fn set_entries(&mut self, count: usize, entries: &[PaletteEntry]) -> usize {
        let mut copied = 0;
        for (dst, src) in self.entries.iter_mut().zip(entries.iter()).take(count) {
            *dst = src.without_flags();
            copied += 1;
        }
        copied
    }

    /// Get a single entry
    #[inline]
    pub fn entry(&self, index: u8) -> PaletteEntry {
        self.entries[index as usize]
    }

    /// All entries
    pub fn as_slice(&self) -> &[PaletteEntry] {
        &self.entries
    }
}

impl Default for SystemPalette {
    fn default() -> Self {
        Self::new()
    }
}

/// Color table bound to the back buffer
///
/// Stores pre-expanded RGBA colors so the blitter does one lookup per pixel.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: [[u8; 4]; PALETTE_SIZE],
    version: u32,
}

impl Palette {
    /// Allocate a palette with every color white and version 0
    pub fn new() -> Self {
        Self {
            colors: [[0xFF; 4]; PALETTE_SIZE],
            version: 0,
        }
    }

    /// Install the system palette colors and bump the version
    pub fn install(&mut self, system: &SystemPalette) {
        for (color, entry) in self.colors.iter_mut().zip(system.as_slice()) {
            *color = entry.to_rgba();
        }
        self.version = self.version.wrapping_add(1);
    }

    /// Current version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Set the version (used when the palette is bound to a new back buffer)
    pub fn reset_version(&mut self, version: u32) {
        self.version = version;
    }

    /// RGBA color for a palette index
    #[inline]
    pub fn rgba(&self, index: u8) -> [u8; 4] {
        self.colors[index as usize]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}
