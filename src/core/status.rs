// Copyright @yucwang 2026

use std::convert::TryFrom;
use std::fmt;

use crate::core::error::RayBatchError;

/// Lifecycle tag of a single ray.
///
/// Byte values match the encoding used by the intersectors, value 1 is left
/// unassigned.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RayStatus {
    Active = 0,
    Terminated = 2,
    ExitedMesh = 3,
    ExitedDomain = 4,
    Lost = 5,
    Abandoned = 6,
}

impl RayStatus {
    pub const ALL: [RayStatus; 6] = [
        RayStatus::Active,
        RayStatus::Terminated,
        RayStatus::ExitedMesh,
        RayStatus::ExitedDomain,
        RayStatus::Lost,
        RayStatus::Abandoned,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    fn bit(self) -> u8 {
        1u8 << (self as u8)
    }
}

impl Default for RayStatus {
    fn default() -> Self {
        RayStatus::Active
    }
}

impl TryFrom<u8> for RayStatus {
    type Error = RayBatchError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RayStatus::Active),
            2 => Ok(RayStatus::Terminated),
            3 => Ok(RayStatus::ExitedMesh),
            4 => Ok(RayStatus::ExitedDomain),
            5 => Ok(RayStatus::Lost),
            6 => Ok(RayStatus::Abandoned),
            v => Err(RayBatchError::UnknownStatus(v)),
        }
    }
}

impl TryFrom<i64> for RayStatus {
    type Error = RayBatchError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let byte = u8::try_from(value).map_err(|_| RayBatchError::InvalidStatus(value))?;
        RayStatus::try_from(byte)
    }
}

impl fmt::Display for RayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RayStatus::Active => "active",
            RayStatus::Terminated => "terminated",
            RayStatus::ExitedMesh => "exited_mesh",
            RayStatus::ExitedDomain => "exited_domain",
            RayStatus::Lost => "lost",
            RayStatus::Abandoned => "abandoned",
        };
        write!(f, "{}", name)
    }
}

/// Small set of statuses, one bit per status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct StatusSet(u8);

impl StatusSet {
    pub const EMPTY: StatusSet = StatusSet(0);
    /// Rays still travelling through the mesh.
    pub const IN_MESH: StatusSet = StatusSet((1 << RayStatus::Active as u8) | (1 << RayStatus::Lost as u8));
    /// Rays that are done for this frame.
    pub const PROCESSED: StatusSet = StatusSet(
        (1 << RayStatus::Terminated as u8)
            | (1 << RayStatus::ExitedDomain as u8)
            | (1 << RayStatus::Abandoned as u8),
    );

    pub fn of(statuses: &[RayStatus]) -> Self {
        statuses.iter().fold(StatusSet::EMPTY, |set, s| set.with(*s))
    }

    pub fn single(status: RayStatus) -> Self {
        StatusSet(status.bit())
    }

    pub fn with(self, status: RayStatus) -> Self {
        StatusSet(self.0 | status.bit())
    }

    pub fn union(self, other: StatusSet) -> Self {
        StatusSet(self.0 | other.0)
    }

    pub fn complement(self) -> Self {
        RayStatus::ALL
            .iter()
            .filter(|s| !self.contains(**s))
            .fold(StatusSet::EMPTY, |set, s| set.with(*s))
    }

    #[inline]
    pub fn contains(&self, status: RayStatus) -> bool {
        self.0 & status.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }
}

impl From<RayStatus> for StatusSet {
    fn from(status: RayStatus) -> Self {
        StatusSet::single(status)
    }
}
