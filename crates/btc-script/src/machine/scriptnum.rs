//! Script number arithmetic with Bitcoin consensus rules.
//!
//! Numbers on the script stack are little-endian byte arrays with a sign
//! bit in the most significant bit of the last byte. Numeric opcodes read
//! operands of at most four bytes, but results may overflow that range and
//! remain valid as long as they are not read back as numbers.

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::error::{MachineError, MachineErrorCode};

/// A script number backed by a big integer so results never overflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptNumber {
    pub val: BigInt,
}

impl ScriptNumber {
    pub fn new(val: i64) -> Self {
        ScriptNumber { val: BigInt::from(val) }
    }

    /// Parse a stack element as a number.
    ///
    /// # Arguments
    /// * `bb` - The encoded number.
    /// * `max_len` - Longest accepted encoding in bytes.
    /// * `require_minimal` - Reject encodings with superfluous trailing zero bytes.
    pub fn from_bytes(bb: &[u8], max_len: usize, require_minimal: bool) -> Result<Self, MachineError> {
        if bb.len() > max_len {
            return Err(MachineError::new(
                MachineErrorCode::NumberTooBig,
                format!(
                    "numeric value encoded as {:02x?} is {} bytes which exceeds the max allowed of {}",
                    bb,
                    bb.len(),
                    max_len
                ),
            ));
        }

        if require_minimal {
            check_minimal_data_encoding(bb)?;
        }

        let Some((&last, _)) = bb.split_last() else {
            return Ok(ScriptNumber { val: BigInt::zero() });
        };

        let mut v = BigInt::zero();
        for (i, &b) in bb.iter().enumerate() {
            v |= BigInt::from(b) << (8 * i);
        }

        if last & 0x80 != 0 {
            let mask = !(BigInt::from(0x80_i64) << (8 * (bb.len() - 1)));
            v &= mask;
            v = -v;
        }

        Ok(ScriptNumber { val: v })
    }

    /// Serialize to the minimal little-endian sign-magnitude encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.val.is_zero() {
            return vec![];
        }

        let is_negative = self.val.is_negative();
        let (_, mut result) = self.val.abs().to_bytes_le();

        if result.last().map_or(false, |b| b & 0x80 != 0) {
            result.push(if is_negative { 0x80 } else { 0x00 });
        } else if is_negative {
            if let Some(last) = result.last_mut() {
                *last |= 0x80;
            }
        }

        result
    }

    pub fn add(&mut self, other: &ScriptNumber) -> &mut Self {
        self.val = &self.val + &other.val;
        self
    }

    pub fn sub(&mut self, other: &ScriptNumber) -> &mut Self {
        self.val = &self.val - &other.val;
        self
    }

    pub fn incr(&mut self) -> &mut Self {
        self.val = &self.val + BigInt::one();
        self
    }

    pub fn decr(&mut self) -> &mut Self {
        self.val = &self.val - BigInt::one();
        self
    }

    pub fn neg(&mut self) -> &mut Self {
        self.val = -self.val.clone();
        self
    }

    pub fn abs(&mut self) -> &mut Self {
        if self.val.is_negative() {
            self.val = -self.val.clone();
        }
        self
    }

    pub fn set(&mut self, i: i64) -> &mut Self {
        self.val = BigInt::from(i);
        self
    }

    pub fn is_zero(&self) -> bool {
        self.val.is_zero()
    }

    pub fn less_than(&self, other: &ScriptNumber) -> bool {
        self.val < other.val
    }

    pub fn less_than_or_equal(&self, other: &ScriptNumber) -> bool {
        self.val <= other.val
    }

    pub fn greater_than(&self, other: &ScriptNumber) -> bool {
        self.val > other.val
    }

    pub fn greater_than_or_equal(&self, other: &ScriptNumber) -> bool {
        self.val >= other.val
    }

    pub fn equal(&self, other: &ScriptNumber) -> bool {
        self.val == other.val
    }

    /// Convert to i32, clamping to [i32::MIN, i32::MAX] on overflow.
    pub fn to_i32(&self) -> i32 {
        match self.val.to_i32() {
            Some(v) => v,
            None if self.val.is_positive() => i32::MAX,
            None => i32::MIN,
        }
    }
}

/// Check that a byte array uses minimal number encoding.
///
/// The last byte may only be 0x00 or 0x80 when the byte before it has its
/// high bit set, since otherwise the sign could have been folded into it.
pub fn check_minimal_data_encoding(v: &[u8]) -> Result<(), MachineError> {
    let Some((&last, rest)) = v.split_last() else {
        return Ok(());
    };

    if last & 0x7f == 0 && rest.last().map_or(true, |b| b & 0x80 == 0) {
        return Err(MachineError::new(
            MachineErrorCode::MinimalData,
            format!("numeric value encoded as {:02x?} is not minimally encoded", v),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_to_bytes(s: &str) -> Vec<u8> {
        hex::decode(s).expect("valid hex")
    }

    #[test]
    fn test_script_num_bytes() {
        let tests: Vec<(i64, &str)> = vec![
            (0, ""),
            (1, "01"),
            (-1, "81"),
            (127, "7f"),
            (-127, "ff"),
            (128, "8000"),
            (-128, "8080"),
            (129, "8100"),
            (-129, "8180"),
            (256, "0001"),
            (-256, "0081"),
            (32767, "ff7f"),
            (-32767, "ffff"),
            (32768, "008000"),
            (-32768, "008080"),
            (65535, "ffff00"),
            (-65535, "ffff80"),
            (8388608, "00008000"),
            (-8388608, "00008080"),
            (2147483647, "ffffff7f"),
            (-2147483647, "ffffffff"),
            // Results outside the operand range still serialize
            (2147483648, "0000008000"),
            (-2147483648, "0000008080"),
            (4294967295, "ffffffff00"),
            (-4294967295, "ffffffff80"),
        ];

        for (num, expected) in &tests {
            let got = ScriptNumber::new(*num).to_bytes();
            assert_eq!(hex::encode(&got), *expected, "num={}", num);
        }
    }

    #[test]
    fn test_from_bytes() {
        struct Test {
            serialized: &'static str,
            num: i64,
            num_len: usize,
            minimal_encoding: bool,
            expect_err: bool,
        }

        let tests = vec![
            Test { serialized: "80", num: 0, num_len: 4, minimal_encoding: true, expect_err: true },
            Test { serialized: "", num: 0, num_len: 4, minimal_encoding: true, expect_err: false },
            Test { serialized: "01", num: 1, num_len: 4, minimal_encoding: true, expect_err: false },
            Test { serialized: "81", num: -1, num_len: 4, minimal_encoding: true, expect_err: false },
            Test { serialized: "8000", num: 128, num_len: 4, minimal_encoding: true, expect_err: false },
            Test { serialized: "8080", num: -128, num_len: 4, minimal_encoding: true, expect_err: false },
            Test { serialized: "ffffff7f", num: 2147483647, num_len: 4, minimal_encoding: true, expect_err: false },
            Test { serialized: "ffffffff", num: -2147483647, num_len: 4, minimal_encoding: true, expect_err: false },
            Test { serialized: "0000008000", num: 0, num_len: 4, minimal_encoding: true, expect_err: true },
            Test { serialized: "00", num: 0, num_len: 4, minimal_encoding: true, expect_err: true },
            Test { serialized: "0100", num: 0, num_len: 4, minimal_encoding: true, expect_err: true },
            Test { serialized: "00", num: 0, num_len: 4, minimal_encoding: false, expect_err: false },
            Test { serialized: "0100", num: 1, num_len: 4, minimal_encoding: false, expect_err: false },
        ];

        for test in &tests {
            let bytes = hex_to_bytes(test.serialized);
            match ScriptNumber::from_bytes(&bytes, test.num_len, test.minimal_encoding) {
                Ok(sn) => {
                    assert!(!test.expect_err, "from_bytes({}): expected error", test.serialized);
                    assert_eq!(sn, ScriptNumber::new(test.num), "from_bytes({})", test.serialized);
                }
                Err(_) => assert!(test.expect_err, "from_bytes({}): unexpected error", test.serialized),
            }
        }
    }

    #[test]
    fn test_to_i32_clamps() {
        assert_eq!(ScriptNumber::new(-5).to_i32(), -5);
        assert_eq!(ScriptNumber::new(2147483648).to_i32(), i32::MAX);
        assert_eq!(ScriptNumber::new(-2147483649).to_i32(), i32::MIN);
    }

    #[test]
    fn test_arithmetic_chaining() {
        let mut n = ScriptNumber::new(5);
        n.add(&ScriptNumber::new(3)).decr().neg();
        assert_eq!(n, ScriptNumber::new(-7));
        n.abs().incr().sub(&ScriptNumber::new(10));
        assert_eq!(n, ScriptNumber::new(-2));
        assert!(n.set(0).is_zero());
    }
}
