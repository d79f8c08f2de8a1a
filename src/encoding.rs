//! Label encoding: a growing bijection between values and dense integer codes.

use std::collections::HashMap;

use crate::error::{DatasetError, DatasetResult};
use crate::types::{Value, ValueKey};

/// Assigns codes `0, 1, 2, ...` to values in first-occurrence order.
///
/// Values are compared with SameValueZero, so `NaN` always maps to one code.
/// One-hot vectors are as long as the vocabulary is *at the time of the call*.
#[derive(Debug, Clone, Default)]
pub struct LabelEncoder {
    values: Vec<Value>,
    codes: HashMap<ValueKey, usize>,
}

impl LabelEncoder {
    /// An encoder with no learned values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code of `value`, learning it if it is new.
    pub fn get_encoded(&mut self, value: &Value) -> usize {
        let key = ValueKey::new(value.clone());
        if let Some(&code) = self.codes.get(&key) {
            return code;
        }
        let code = self.values.len();
        self.values.push(value.clone());
        self.codes.insert(key, code);
        code
    }

    /// Code of an already-learned value.
    pub fn position(&self, value: &Value) -> Option<usize> {
        self.codes.get(&ValueKey::new(value.clone())).copied()
    }

    /// Value stored under `index`.
    pub fn get_decoded(&self, index: usize) -> DatasetResult<&Value> {
        self.values.get(index).ok_or(DatasetError::EncodingRange {
            index,
            len: self.values.len(),
        })
    }

    /// One-hot vector for a learned value, as long as the current value count.
    pub fn get_one_hot_encoded(&self, value: &Value) -> DatasetResult<Vec<u8>> {
        let index = self.position(value).ok_or_else(|| DatasetError::UnknownLabel {
            value: value.to_string(),
        })?;
        self.get_one_hot_encoded_by_index(index)
    }

    /// One-hot vector with a 1 at `index`.
    pub fn get_one_hot_encoded_by_index(&self, index: usize) -> DatasetResult<Vec<u8>> {
        if index >= self.values.len() {
            return Err(DatasetError::EncodingRange {
                index,
                len: self.values.len(),
            });
        }
        let mut out = vec![0u8; self.values.len()];
        out[index] = 1;
        Ok(out)
    }

    /// Number of distinct values learned so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Learned values, indexed by code.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::LabelEncoder;
    use crate::error::DatasetError;
    use crate::types::Value;
    use proptest::prelude::*;

    #[test]
    fn encodes_in_first_occurrence_order() {
        let mut enc = LabelEncoder::new();
        assert_eq!(enc.get_encoded(&Value::from("x")), 0);
        assert_eq!(enc.get_encoded(&Value::from("y")), 1);
        assert_eq!(enc.get_encoded(&Value::from("x")), 0);
        assert_eq!(enc.get_encoded(&Value::Number(f64::NAN)), 2);
        assert_eq!(enc.get_encoded(&Value::Number(f64::NAN)), 2);
        assert_eq!(enc.len(), 3);
        assert_eq!(enc.get_decoded(1).unwrap(), &Value::from("y"));
    }

    #[test]
    fn decode_out_of_range_fails() {
        let mut enc = LabelEncoder::new();
        enc.get_encoded(&Value::Bool(true));
        let err = enc.get_decoded(1).unwrap_err();
        assert!(matches!(err, DatasetError::EncodingRange { index: 1, len: 1 }));
    }

    #[test]
    fn one_hot_length_tracks_vocabulary() {
        let mut enc = LabelEncoder::new();
        enc.get_encoded(&Value::from("a"));
        enc.get_encoded(&Value::from("b"));
        let before = enc.get_one_hot_encoded(&Value::from("a")).unwrap();
        assert_eq!(before, vec![1, 0]);

        enc.get_encoded(&Value::from("c"));
        let after = enc.get_one_hot_encoded(&Value::from("a")).unwrap();
        assert_eq!(after, vec![1, 0, 0]);

        assert!(matches!(
            enc.get_one_hot_encoded(&Value::from("zzz")),
            Err(DatasetError::UnknownLabel { .. })
        ));
        assert!(enc.get_one_hot_encoded_by_index(3).is_err());
    }

    proptest! {
        #[test]
        fn encode_then_decode_is_identity(words in proptest::collection::vec("[a-e]{0,3}", 0..40)) {
            let mut enc = LabelEncoder::new();
            let codes: Vec<usize> = words.iter().map(|w| enc.get_encoded(&Value::from(w.as_str()))).collect();
            for (w, code) in words.iter().zip(&codes) {
                prop_assert_eq!(enc.get_decoded(*code).unwrap(), &Value::from(w.as_str()));
                prop_assert_eq!(enc.get_encoded(&Value::from(w.as_str())), *code);
            }
            for (i, a) in words.iter().enumerate() {
                for (j, b) in words.iter().enumerate() {
                    prop_assert_eq!(a == b, codes[i] == codes[j]);
                }
            }
        }

        #[test]
        fn one_hot_has_single_bit_at_code(n in 1usize..20) {
            let mut enc = LabelEncoder::new();
            for i in 0..n {
                enc.get_encoded(&Value::Number(i as f64));
            }
            for i in 0..n {
                let v = enc.get_one_hot_encoded_by_index(i).unwrap();
                prop_assert_eq!(v.len(), n);
                prop_assert_eq!(v.iter().filter(|&&b| b == 1).count(), 1);
                prop_assert_eq!(v[i], 1);
            }
        }
    }
}
