//! Case ids excluded from execution.
//!
//! Only drivers consult this; the parser and oracle never do.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Why a case is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum SkipReason {
    /// Uses `#` null references or 32/64/128-bit decimal encodings.
    FixedWidthEncoding,
    /// Known divergence between reference environments (operand range
    /// limits, invalid contexts, disputed results).
    EnvironmentDivergence,
    /// The engine does not implement the operation.
    UnimplementedOperation,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedWidthEncoding => write!(f, "fixed-width encoding"),
            Self::EnvironmentDivergence => write!(f, "environment divergence"),
            Self::UnimplementedOperation => write!(f, "unimplemented operation"),
        }
    }
}

/// Null references and fixed-width encodings.
const FIXED_WIDTH_IDS: &[&str] = &[
    "add900", "add901", "absx900", "addx9990", "addx9991", "clam090", "clam091", "clam092",
    "clam093", "clam094", "clam095", "clam096", "clam097", "clam098", "clam099", "clam189",
    "clam190", "clam191", "clam192", "clam193", "clam194", "clam195", "clam196", "clam197",
    "clam198", "clam199", "comx990", "comx991", "cotx9990", "cotx9991", "ctmx9990", "ctmx9991",
    "ddabs900", "ddadd9990", "ddadd9991", "ddcom9990", "ddcom9991", "ddcot9990", "ddcot9991",
    "ddctm9990", "ddctm9991", "dddiv9998", "dddiv9999", "dddvi900", "dddvi901", "ddfma2990",
    "ddfma2991", "ddfma39990", "ddfma39991", "ddlogb900", "ddmax900", "ddmax901", "ddmxg900",
    "ddmxg901", "ddmin900", "ddmin901", "ddmng900", "ddmng901", "ddmul9990", "ddmul9991",
    "ddnextm900", "ddnextp900", "ddnextt900", "ddnextt901", "ddqua998", "ddqua999", "ddred900",
    "ddrem1000", "ddrem1001", "ddrmn1000", "ddrmn1001", "ddsub9990", "ddsub9991", "ddintx074",
    "ddintx094", "divx9998", "divx9999", "dvix900", "dvix901", "dqabs900", "dqadd9990",
    "dqadd9991", "dqcom990", "dqcom991", "dqcot9990", "dqcot9991", "dqctm9990", "dqctm9991",
    "dqdiv9998", "dqdiv9999", "dqdvi900", "dqdvi901", "dqfma2990", "dqfma2991", "dqadd39990",
    "dqadd39991", "dqlogb900", "dqmax900", "dqmax901", "dqmxg900", "dqmxg901", "dqmin900",
    "dqmin901", "dqmng900", "dqmng901", "dqmul9990", "dqmul9991", "dqnextm900", "dqnextp900",
    "dqnextt900", "dqnextt901", "dqqua998", "dqqua999", "dqred900", "dqrem1000", "dqrem1001",
    "dqrmn1000", "dqrmn1001", "dqsub9990", "dqsub9991", "dqintx074", "dqintx094", "expx900",
    "fmax2990", "fmax2991", "fmax39990", "fmax39991", "lnx900", "logx900", "logbx900", "maxx900",
    "maxx901", "mxgx900", "mxgx901", "mnm900", "mnm901", "mng900", "mng901", "minx900", "mulx990",
    "mulx991", "nextm900", "nextp900", "nextt900", "nextt901", "plu900", "powx900", "powx901",
    "pwsx900", "quax1022", "quax1023", "quax1024", "quax1025", "quax1026", "quax1027", "quax1028",
    "quax1029", "quax0a2", "quax0a3", "quax998", "quax999", "redx900", "remx1000", "remx1001",
    "rmnx900", "rmnx901", "sqtx9900", "subx9990", "subx9991",
];

/// Operand range violations, invalid contexts, and disputed results.
const DIVERGENT_IDS: &[&str] = &[
    "expx901", "expx902", "expx903", "expx905", "lnx901", "lnx902", "lnx903", "lnx905", "logx901",
    "logx902", "logx903", "logx905", "powx1183", "powx1184", "powx4001", "powx4002", "powx4003",
    "powx4005", "powx4008", "powx4010", "powx4012", "powx4014", "scbx164", "scbx165", "scbx166",
    "powx4302", "powx4303", "powx4342", "powx4343", "pwsx805", "pwmx325", "pwmx326",
];

/// Immutable id → reason lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet {
    entries: HashMap<String, SkipReason>,
}

impl SkipSet {
    /// A set that excludes nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in exclusion list, built once per process.
    #[must_use]
    pub fn builtin() -> &'static Self {
        static BUILTIN: OnceLock<SkipSet> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut set = Self::from_ids(
                FIXED_WIDTH_IDS.iter().copied(),
                SkipReason::FixedWidthEncoding,
            );
            set.extend(Self::from_ids(
                DIVERGENT_IDS.iter().copied(),
                SkipReason::EnvironmentDivergence,
            ));
            set
        })
    }

    /// Excludes every id in `ids` for `reason`.
    #[must_use]
    pub fn from_ids<I, S>(ids: I, reason: SkipReason) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: ids.into_iter().map(|id| (id.into(), reason)).collect(),
        }
    }

    /// Merges `other` into this set; later reasons win.
    pub fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Why `id` is excluded, if it is.
    #[must_use]
    pub fn reason(&self, id: &str) -> Option<SkipReason> {
        self.entries.get(id).copied()
    }

    /// Whether `id` is excluded.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of excluded ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{SkipReason, SkipSet, DIVERGENT_IDS, FIXED_WIDTH_IDS};

    #[test]
    fn builtin_set_covers_both_lists() {
        let builtin = SkipSet::builtin();
        assert_eq!(builtin.len(), FIXED_WIDTH_IDS.len() + DIVERGENT_IDS.len());
        assert_eq!(builtin.reason("ddadd9990"), Some(SkipReason::FixedWidthEncoding));
        assert_eq!(builtin.reason("pwmx325"), Some(SkipReason::EnvironmentDivergence));
        assert!(!builtin.contains("addx001"));
    }

    #[test]
    fn builtin_is_initialized_once() {
        assert!(std::ptr::eq(SkipSet::builtin(), SkipSet::builtin()));
    }

    #[test]
    fn engine_specific_sets_merge() {
        let mut set = SkipSet::from_ids(["sqtx001"], SkipReason::UnimplementedOperation);
        assert!(set.contains("sqtx001"));
        set.extend(SkipSet::from_ids(
            vec![String::from("lnx001")],
            SkipReason::UnimplementedOperation,
        ));
        assert_eq!(set.len(), 2);
        assert!(SkipSet::empty().is_empty());
    }
}
