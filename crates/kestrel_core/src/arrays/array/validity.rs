/// Row validity for an array.
///
/// Starts out as "all valid" and only allocates a bitmap once a row is marked
/// invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validity {
    inner: ValidityInner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ValidityInner {
    AllValid { len: usize },
    Mask { bits: Vec<u64>, len: usize },
}

impl Validity {
    pub fn new_all_valid(len: usize) -> Self {
        Validity {
            inner: ValidityInner::AllValid { len },
        }
    }

    pub fn new_all_invalid(len: usize) -> Self {
        Validity {
            inner: ValidityInner::Mask {
                bits: vec![0; len.div_ceil(64)],
                len,
            },
        }
    }

    pub fn from_iter_valid(iter: impl IntoIterator<Item = bool>) -> Self {
        let mut bits = Vec::new();
        let mut len = 0;
        let mut all_valid = true;

        for valid in iter {
            if len % 64 == 0 {
                bits.push(0);
            }
            if valid {
                bits[len / 64] |= 1 << (len % 64);
            } else {
                all_valid = false;
            }
            len += 1;
        }

        if all_valid {
            return Self::new_all_valid(len);
        }

        Validity {
            inner: ValidityInner::Mask { bits, len },
        }
    }

    pub fn len(&self) -> usize {
        match &self.inner {
            ValidityInner::AllValid { len } => *len,
            ValidityInner::Mask { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all_valid(&self) -> bool {
        match &self.inner {
            ValidityInner::AllValid { .. } => true,
            ValidityInner::Mask { .. } => self.count_valid() == self.len(),
        }
    }

    pub fn is_valid(&self, idx: usize) -> bool {
        match &self.inner {
            ValidityInner::AllValid { .. } => true,
            ValidityInner::Mask { bits, .. } => bits[idx / 64] & (1 << (idx % 64)) != 0,
        }
    }

    pub fn set_invalid(&mut self, idx: usize) {
        if let ValidityInner::AllValid { len } = self.inner {
            let mut bits = vec![u64::MAX; len.div_ceil(64)];
            // Keep bits past len cleared so counting stays exact.
            if len % 64 != 0 {
                if let Some(last) = bits.last_mut() {
                    *last = (1 << (len % 64)) - 1;
                }
            }
            self.inner = ValidityInner::Mask { bits, len };
        }

        if let ValidityInner::Mask { bits, .. } = &mut self.inner {
            bits[idx / 64] &= !(1 << (idx % 64));
        }
    }

    pub fn count_valid(&self) -> usize {
        match &self.inner {
            ValidityInner::AllValid { len } => *len,
            ValidityInner::Mask { bits, .. } => {
                bits.iter().map(|b| b.count_ones() as usize).sum()
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len()).map(|idx| self.is_valid(idx))
    }

    /// Validity for the rows at `indices`, in order.
    pub fn select(&self, indices: &[usize]) -> Self {
        match &self.inner {
            ValidityInner::AllValid { .. } => Self::new_all_valid(indices.len()),
            ValidityInner::Mask { .. } => {
                Self::from_iter_valid(indices.iter().map(|&idx| self.is_valid(idx)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_invalid_materializes_mask() {
        let mut validity = Validity::new_all_valid(70);
        assert!(validity.all_valid());

        validity.set_invalid(65);
        assert!(!validity.all_valid());
        assert!(!validity.is_valid(65));
        assert!(validity.is_valid(64));
        assert!(validity.is_valid(69));
        assert_eq!(69, validity.count_valid());
    }

    #[test]
    fn from_iter() {
        let validity = Validity::from_iter_valid([true, false, true]);
        assert_eq!(3, validity.len());
        assert_eq!(vec![true, false, true], validity.iter().collect::<Vec<_>>());

        let validity = Validity::from_iter_valid([true, true]);
        assert!(validity.all_valid());
    }

    #[test]
    fn select_rows() {
        let validity = Validity::from_iter_valid([true, false, true]);
        let selected = validity.select(&[1, 1, 0]);
        assert_eq!(vec![false, false, true], selected.iter().collect::<Vec<_>>());
    }
}
