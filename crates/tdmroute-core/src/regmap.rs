//! Register field model and the read-modify-write contract.
//!
//! Routing blocks expose 32-bit registers at a 4-byte stride. Resolvers never
//! write whole registers: every update is a masked read-modify-write through
//! [`RegisterMap::update_bits`], either with a raw mask or through a
//! [`RegField`] descriptor.
//!
//! The register collaborator owns atomicity of each individual update. No
//! multi-register transaction is ever required; a resolver that stops half way
//! leaves independent per-pin/per-field values behind, never a torn one.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Byte distance between consecutive registers.
pub const REG_STRIDE: u32 = 4;

/// Register map geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegmapConfig {
    /// Register address width in bits.
    pub reg_bits: u32,
    /// Register value width in bits.
    pub val_bits: u32,
    /// Byte distance between registers.
    pub reg_stride: u32,
    /// Highest valid register offset.
    pub max_register: u32,
}

impl RegmapConfig {
    /// 32-bit registers at [`REG_STRIDE`] up to `max_register`.
    pub const fn mmio32(max_register: u32) -> Self {
        Self {
            reg_bits: 32,
            val_bits: 32,
            reg_stride: REG_STRIDE,
            max_register,
        }
    }

    /// Returns true if `reg` is aligned and within range.
    pub const fn is_valid(&self, reg: u32) -> bool {
        reg <= self.max_register && reg % self.reg_stride == 0
    }

    /// Number of registers addressable under this configuration.
    pub const fn register_count(&self) -> usize {
        (self.max_register / self.reg_stride) as usize + 1
    }
}

/// A bit field inside one register, as an inclusive `lsb..=msb` range.
///
/// # Example
///
/// ```rust
/// use tdmroute_core::RegField;
///
/// let dat_sel = RegField::new(0x0, 16, 20);
/// assert_eq!(dat_sel.width(), 5);
/// assert_eq!(dat_sel.mask(), 0x001F_0000);
/// assert_eq!(dat_sel.encode(11), 11 << 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegField {
    /// Register offset.
    pub reg: u32,
    /// Lowest bit of the field.
    pub lsb: u8,
    /// Highest bit of the field (inclusive).
    pub msb: u8,
}

impl RegField {
    /// Creates a field descriptor.
    ///
    /// `lsb <= msb <= 31` is checked in debug builds.
    pub const fn new(reg: u32, lsb: u8, msb: u8) -> Self {
        debug_assert!(lsb <= msb && msb < 32);
        Self { reg, lsb, msb }
    }

    /// Field covering `width` bits starting at `lsb`.
    pub const fn with_width(reg: u32, lsb: u8, width: u8) -> Self {
        Self::new(reg, lsb, lsb + width - 1)
    }

    /// Returns true if the descriptor fits a 32-bit register.
    pub const fn is_valid(&self) -> bool {
        self.lsb <= self.msb && self.msb < 32
    }

    /// Field width in bits.
    pub const fn width(&self) -> u32 {
        (self.msb - self.lsb) as u32 + 1
    }

    /// Register mask covering the field.
    pub const fn mask(&self) -> u32 {
        let ones = if self.width() >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width()) - 1
        };
        ones << self.lsb
    }

    /// Largest value the field can hold.
    pub const fn max_value(&self) -> u32 {
        self.mask() >> self.lsb
    }

    /// Places `value` at the field position, truncated to the field width.
    pub const fn encode(&self, value: u32) -> u32 {
        (value << self.lsb) & self.mask()
    }

    /// Extracts the field from a register word.
    pub const fn decode(&self, word: u32) -> u32 {
        (word & self.mask()) >> self.lsb
    }

    /// Returns true if both fields live in the same register and share bits.
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.reg == other.reg && self.mask() & other.mask() != 0
    }
}

/// The register access collaborator.
///
/// Each call must be observed as one indivisible update of its register.
/// Failures are not reported back: the collaborator either succeeds or fails
/// fatally on its side.
pub trait RegisterMap {
    /// Reads a register.
    fn read(&self, reg: u32) -> u32;

    /// Replaces the bits of `reg` selected by `mask` with those of `value`.
    fn update_bits(&mut self, reg: u32, mask: u32, value: u32);

    /// Writes `value` into `field`.
    fn write_field(&mut self, field: RegField, value: u32) {
        self.update_bits(field.reg, field.mask(), field.encode(value));
    }

    /// Reads `field`.
    fn read_field(&self, field: RegField) -> u32 {
        field.decode(self.read(field.reg))
    }
}

/// One masked register update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterWrite {
    /// Register offset.
    pub reg: u32,
    /// Bits being replaced.
    pub mask: u32,
    /// New bit values (already positioned under `mask`).
    pub value: u32,
}

impl RegisterWrite {
    /// A raw masked update.
    pub const fn new(reg: u32, mask: u32, value: u32) -> Self {
        Self { reg, mask, value }
    }

    /// The update writing `value` into `field`.
    pub const fn field(field: RegField, value: u32) -> Self {
        Self::new(field.reg, field.mask(), field.encode(value))
    }

    /// Returns the register word after applying this update to `word`.
    pub const fn apply_to(&self, word: u32) -> u32 {
        (word & !self.mask) | (self.value & self.mask)
    }
}

/// Ordered register updates computed by a resolver.
///
/// Each update is applied atomically on its own; the list as a whole is not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingAssignment {
    writes: Vec<RegisterWrite>,
}

impl RoutingAssignment {
    /// Creates an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw masked update.
    pub fn push(&mut self, write: RegisterWrite) {
        self.writes.push(write);
    }

    /// Appends a field update.
    pub fn push_field(&mut self, field: RegField, value: u32) {
        self.writes.push(RegisterWrite::field(field, value));
    }

    /// The updates, in application order.
    pub fn writes(&self) -> &[RegisterWrite] {
        &self.writes
    }

    /// Number of updates.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Returns true if there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Issues every update, in order, through `regmap`.
    pub fn apply(&self, regmap: &mut dyn RegisterMap) {
        for write in &self.writes {
            regmap.update_bits(write.reg, write.mask, write.value);
        }
    }
}

impl core::iter::Extend<RegisterWrite> for RoutingAssignment {
    fn extend<T: IntoIterator<Item = RegisterWrite>>(&mut self, iter: T) {
        self.writes.extend(iter);
    }
}

/// In-memory register file.
///
/// Holds one word per register of a [`RegmapConfig`] and logs every update in
/// order. Updates to misaligned or out-of-range offsets are dropped (and
/// logged with the `tracing` feature), matching a bus that ignores them.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    config: RegmapConfig,
    words: Vec<u32>,
    log: Vec<RegisterWrite>,
}

impl RegisterFile {
    /// Creates a zeroed register file.
    pub fn new(config: RegmapConfig) -> Self {
        let mut words = Vec::new();
        words.resize(config.register_count(), 0);
        Self {
            config,
            words,
            log: Vec::new(),
        }
    }

    /// Register geometry.
    pub fn config(&self) -> RegmapConfig {
        self.config
    }

    /// Overwrites a register without logging (reset values, preloads).
    ///
    /// Returns false if `reg` is not a valid offset.
    pub fn preload(&mut self, reg: u32, value: u32) -> bool {
        match self.slot(reg) {
            Some(idx) => {
                self.words[idx] = value;
                true
            }
            None => false,
        }
    }

    /// Every update issued so far, in order.
    pub fn log(&self) -> &[RegisterWrite] {
        &self.log
    }

    /// Drains the write log, keeping register contents.
    pub fn take_log(&mut self) -> Vec<RegisterWrite> {
        core::mem::take(&mut self.log)
    }

    /// `(offset, value)` for every register, in address order.
    pub fn dump(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let stride = self.config.reg_stride;
        self.words
            .iter()
            .enumerate()
            .map(move |(i, &w)| (i as u32 * stride, w))
    }

    fn slot(&self, reg: u32) -> Option<usize> {
        self.config
            .is_valid(reg)
            .then(|| (reg / self.config.reg_stride) as usize)
    }
}

impl RegisterMap for RegisterFile {
    fn read(&self, reg: u32) -> u32 {
        self.slot(reg).map_or(0, |idx| self.words[idx])
    }

    fn update_bits(&mut self, reg: u32, mask: u32, value: u32) {
        let Some(idx) = self.slot(reg) else {
            #[cfg(feature = "tracing")]
            tracing::error!("regmap: dropped update of invalid register {reg:#x}");
            return;
        };
        let write = RegisterWrite::new(reg, mask, value);
        let old = self.words[idx];
        self.words[idx] = write.apply_to(old);
        self.log.push(write);
        #[cfg(feature = "tracing")]
        tracing::trace!(
            "regmap: {reg:#04x} {old:#010x} -> {:#010x} (mask {mask:#010x})",
            self.words[idx]
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "std"))]
    use alloc::vec;

    #[test]
    fn field_masks() {
        assert_eq!(RegField::new(0, 0, 2).mask(), 0x7);
        assert_eq!(RegField::new(0, 4, 6).mask(), 0x70);
        assert_eq!(RegField::new(0, 12, 14).mask(), 0x7000);
        assert_eq!(RegField::new(0, 16, 20).mask(), 0x1F_0000);
        assert_eq!(RegField::new(0, 0, 31).mask(), u32::MAX);
        assert_eq!(RegField::with_width(0x4, 8, 5).mask(), 0x1F00);
    }

    #[test]
    fn field_encode_truncates() {
        let field = RegField::new(0, 4, 6);
        assert_eq!(field.encode(3), 0x30);
        assert_eq!(field.encode(0xF), 0x70);
        assert_eq!(field.max_value(), 7);
    }

    #[test]
    fn field_decode() {
        let field = RegField::new(0, 16, 20);
        assert_eq!(field.decode(0xFFFF_FFFF), 0x1F);
        assert_eq!(field.decode((11 << 16) | 0xFF), 11);
    }

    #[test]
    fn overlap_detection() {
        let a = RegField::new(0, 0, 2);
        let b = RegField::new(0, 2, 4);
        let c = RegField::new(0, 4, 6);
        let d = RegField::new(4, 0, 2);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn config_validity() {
        let config = RegmapConfig::mmio32(0x28);
        assert!(config.is_valid(0x0));
        assert!(config.is_valid(0x28));
        assert!(!config.is_valid(0x2));
        assert!(!config.is_valid(0x2C));
        assert_eq!(config.register_count(), 11);
        assert_eq!(RegmapConfig::mmio32(0x1).register_count(), 1);
    }

    #[test]
    fn update_bits_is_masked() {
        let mut regs = RegisterFile::new(RegmapConfig::mmio32(0x8));
        regs.preload(0x4, 0xFFFF_FFFF);
        regs.update_bits(0x4, 0x1F00, 0x0300);
        assert_eq!(regs.read(0x4), 0xFFFF_E3FF);
        assert_eq!(regs.log(), &[RegisterWrite::new(0x4, 0x1F00, 0x0300)]);
    }

    #[test]
    fn value_bits_outside_mask_are_ignored() {
        let mut regs = RegisterFile::new(RegmapConfig::mmio32(0x0));
        regs.update_bits(0x0, 0x1F00, 0x3);
        assert_eq!(regs.read(0x0), 0);
    }

    #[test]
    fn invalid_register_update_dropped() {
        let mut regs = RegisterFile::new(RegmapConfig::mmio32(0x8));
        regs.update_bits(0xC, u32::MAX, 1);
        regs.update_bits(0x2, u32::MAX, 1);
        assert!(regs.log().is_empty());
        assert_eq!(regs.read(0xC), 0);
        assert!(!regs.preload(0xC, 1));
    }

    #[test]
    fn write_field_through_trait() {
        let mut regs = RegisterFile::new(RegmapConfig::mmio32(0x0));
        let field = RegField::new(0, 16, 20);
        regs.write_field(field, 11);
        assert_eq!(regs.read(0), 11 << 16);
        assert_eq!(regs.read_field(field), 11);
    }

    #[test]
    fn assignment_applies_in_order() {
        let mut assignment = RoutingAssignment::new();
        assignment.push(RegisterWrite::new(0, 0xFF, 0x12));
        assignment.push(RegisterWrite::new(0, 0x0F, 0x03));
        assert_eq!(assignment.len(), 2);

        let mut regs = RegisterFile::new(RegmapConfig::mmio32(0x0));
        assignment.apply(&mut regs);
        assert_eq!(regs.read(0), 0x13);
    }

    #[test]
    fn dump_lists_every_register() {
        let mut regs = RegisterFile::new(RegmapConfig::mmio32(0x8));
        regs.preload(0x8, 7);
        let dump: Vec<_> = regs.dump().collect();
        assert_eq!(dump, vec![(0x0, 0), (0x4, 0), (0x8, 7)]);
    }

    #[test]
    fn take_log_keeps_contents() {
        let mut regs = RegisterFile::new(RegmapConfig::mmio32(0x0));
        regs.update_bits(0, 1, 1);
        assert_eq!(regs.take_log().len(), 1);
        assert!(regs.log().is_empty());
        assert_eq!(regs.read(0), 1);
    }
}
