use crate::index_space::Axis;




/**
 * Enum to hold a unit vector in 3D space
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    I,
    J,
    K,
}




// ============================================================================
impl Direction {
    pub fn along(&self, other: Direction) -> f64 {
        if *self == other {
            1.0
        } else {
            0.0
        }
    }

    /**
     * The vector components that land in slots (0, 1, 2) of a state rotated
     * so that this direction comes first. The remaining two components keep
     * their cyclic order.
     */
    pub fn permutation(&self) -> [usize; 3] {
        match self {
            Direction::I => [0, 1, 2],
            Direction::J => [1, 2, 0],
            Direction::K => [2, 0, 1],
        }
    }

    /**
     * Rotate a 3-vector so this direction is its first component.
     */
    pub fn rotate(&self, v: [f64; 3]) -> [f64; 3] {
        let p = self.permutation();
        [v[p[0]], v[p[1]], v[p[2]]]
    }

    /**
     * Undo `rotate`.
     */
    pub fn unrotate(&self, r: [f64; 3]) -> [f64; 3] {
        let p = self.permutation();
        let mut v = [0.0; 3];
        for a in 0..3 {
            v[p[a]] = r[a]
        }
        v
    }
}

impl From<Axis> for Direction {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::I => Direction::I,
            Axis::J => Direction::J,
            Axis::K => Direction::K,
        }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::Direction;

    #[test]
    fn rotation_puts_the_solve_direction_first() {
        let v = [1.0, 2.0, 3.0];
        assert_eq!(Direction::I.rotate(v), [1.0, 2.0, 3.0]);
        assert_eq!(Direction::J.rotate(v), [2.0, 3.0, 1.0]);
        assert_eq!(Direction::K.rotate(v), [3.0, 1.0, 2.0]);
    }

    #[test]
    fn unrotate_inverts_rotate() {
        let v = [1.0, -2.0, 5.0];
        for d in &[Direction::I, Direction::J, Direction::K] {
            assert_eq!(d.unrotate(d.rotate(v)), v);
        }
    }
}
