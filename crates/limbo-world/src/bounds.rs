//! Axis-aligned block boxes and coordinate strings.

use limbo_proto::BlockPos;

use crate::error::WorldError;

/// Inclusive integer box. Corners are normalized on construction so
/// containment never has to reorder them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl Aabb {
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Parse two `"x,y,z"` corner strings. Components are floored.
    pub fn parse(pos1: &str, pos2: &str) -> Result<Self, WorldError> {
        let [x1, y1, z1] = parse_vec3(pos1)?;
        let [x2, y2, z2] = parse_vec3(pos2)?;
        Ok(Self::new(
            BlockPos::floor(x1, y1, z1),
            BlockPos::floor(x2, y2, z2),
        ))
    }

    pub fn contains(&self, p: BlockPos) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    /// Every block inside the box.
    pub fn blocks(&self) -> impl Iterator<Item = BlockPos> + '_ {
        (self.min.x..=self.max.x).flat_map(move |x| {
            (self.min.y..=self.max.y)
                .flat_map(move |y| (self.min.z..=self.max.z).map(move |z| BlockPos::new(x, y, z)))
        })
    }
}

/// Parse up to `N` comma-separated numbers. Missing trailing components are 0.
pub fn parse_numbers<const N: usize>(s: &str) -> Result<[f64; N], WorldError> {
    let mut out = [0.0; N];
    if s.trim().is_empty() {
        return Ok(out);
    }
    for (i, part) in s.split(',').enumerate() {
        if i >= N {
            return Err(WorldError::BadCoordinates(s.to_owned()));
        }
        out[i] = part
            .trim()
            .parse::<f64>()
            .map_err(|_| WorldError::BadCoordinates(s.to_owned()))?;
    }
    Ok(out)
}

pub fn parse_vec3(s: &str) -> Result<[f64; 3], WorldError> {
    parse_numbers::<3>(s)
}
