//! Payload bounds for arena-backed containers.

use bytemuck::Zeroable;

/// A fixed-size value that can live in a raw memory block.
///
/// Arena blocks are created zero-filled and grown by byte copies, so an
/// element must be `Copy` (moving it is a plain memcpy, dropping it is a
/// no-op) and [`Zeroable`] (the all-zero bit pattern is a valid value).
///
/// Implemented automatically for every type meeting those bounds: all
/// primitive integers and floats, `bool`, arrays of elements, and any
/// `#[derive(Clone, Copy, Zeroable)]` struct.
pub trait Element: Copy + Zeroable + 'static {}

impl<T: Copy + Zeroable + 'static> Element for T {}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_element<T: Element>() {}

    #[derive(Clone, Copy, Zeroable)]
    struct Pair {
        _a: u32,
        _b: f64,
    }

    #[test]
    fn primitives_and_derived_structs_are_elements() {
        assert_element::<u8>();
        assert_element::<i64>();
        assert_element::<f32>();
        assert_element::<bool>();
        assert_element::<[u16; 4]>();
        assert_element::<Pair>();
    }

    #[test]
    fn zeroed_element_is_default_like() {
        let v: i64 = Zeroable::zeroed();
        assert_eq!(v, 0);
        let b: bool = Zeroable::zeroed();
        assert!(!b);
    }
}
