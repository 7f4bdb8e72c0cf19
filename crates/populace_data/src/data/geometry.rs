use serde::{Deserialize, Serialize};

/// Width and depth of a region, in blocks.
pub const REGION_SIZE: i32 = 16;

/// Integer block coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn above(self) -> Self {
        Self::new(self.x, self.y + 1, self.z)
    }

    #[must_use]
    pub const fn below(self) -> Self {
        Self::new(self.x, self.y - 1, self.z)
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Squared distance between two block coordinates.
    #[inline]
    #[must_use]
    pub fn dist_sqr(self, other: BlockPos) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        let dz = f64::from(self.z) - f64::from(other.z);
        dx * dx + dy * dy + dz * dz
    }

    /// Point where an entity standing in this cell has its feet.
    #[must_use]
    pub fn bottom_center(self) -> Vec3 {
        Vec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y),
            f64::from(self.z) + 0.5,
        )
    }

    #[must_use]
    pub fn center(self) -> Vec3 {
        Vec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 0.5,
            f64::from(self.z) + 0.5,
        )
    }

    #[must_use]
    pub fn region(self) -> RegionKey {
        RegionKey::containing(self.x, self.z)
    }
}

/// Continuous world coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    #[must_use]
    pub fn distance_sqr(self, other: Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// The block cell containing this point.
    #[must_use]
    pub fn block_pos(self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

/// Identifies a 16x16 column region of the world.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct RegionKey {
    pub x: i32,
    pub z: i32,
}

impl RegionKey {
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Region containing the given block column. Uses arithmetic shift so
    /// negative coordinates floor correctly.
    #[must_use]
    pub const fn containing(block_x: i32, block_z: i32) -> Self {
        Self::new(block_x >> 4, block_z >> 4)
    }

    #[must_use]
    pub const fn min_block_x(self) -> i32 {
        self.x * REGION_SIZE
    }

    #[must_use]
    pub const fn min_block_z(self) -> i32 {
        self.z * REGION_SIZE
    }

    /// Horizontal centre of the region, in block units.
    #[must_use]
    pub fn center_xz(self) -> (f64, f64) {
        (
            f64::from(self.min_block_x() + REGION_SIZE / 2),
            f64::from(self.min_block_z() + REGION_SIZE / 2),
        )
    }

    /// Chebyshev distance in regions.
    #[must_use]
    pub fn chessboard_distance(self, other: RegionKey) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box of the given footprint width and height whose bottom face is
    /// centred on `feet`.
    #[must_use]
    pub fn from_feet(feet: Vec3, width: f64, height: f64) -> Self {
        let half = width / 2.0;
        Self {
            min: Vec3::new(feet.x - half, feet.y, feet.z - half),
            max: Vec3::new(feet.x + half, feet.y + height, feet.z + half),
        }
    }

    /// Every block cell the box overlaps. Touching a face does not count
    /// as overlap.
    pub fn covered_blocks(&self) -> impl Iterator<Item = BlockPos> {
        let (x0, x1) = (self.min.x.floor() as i32, self.max.x.ceil() as i32);
        let (y0, y1) = (self.min.y.floor() as i32, self.max.y.ceil() as i32);
        let (z0, z1) = (self.min.z.floor() as i32, self.max.z.ceil() as i32);
        (y0..y1).flat_map(move |y| {
            (z0..z1).flat_map(move |z| (x0..x1).map(move |x| BlockPos::new(x, y, z)))
        })
    }
}
