use serde::{Deserialize, Serialize};

/// Shape of a particle.
///
/// The shape fixes the particle's connection capacity: the exact total
/// bond multiplicity a particle of this shape carries in a stable
/// molecule.
///
/// # Examples
///
/// ```
/// use molsynth::ParticleType;
///
/// assert_eq!(ParticleType::Triangle.capacity(), 3);
/// assert_eq!(ParticleType::from_name("pentagon"), Some(ParticleType::Pentagon));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleType {
    Circle,
    Square,
    Triangle,
    Pentagon,
}

impl ParticleType {
    /// All shapes in priority order (circle < square < triangle < pentagon).
    pub const ALL: [ParticleType; 4] = [
        ParticleType::Circle,
        ParticleType::Square,
        ParticleType::Triangle,
        ParticleType::Pentagon,
    ];

    pub fn capacity(self) -> u8 {
        match self {
            Self::Circle => 1,
            Self::Square => 2,
            Self::Triangle => 3,
            Self::Pentagon => 4,
        }
    }

    /// Sort priority used when merging synthesis survivors.
    pub fn priority(self) -> u8 {
        match self {
            Self::Circle => 0,
            Self::Square => 1,
            Self::Triangle => 2,
            Self::Pentagon => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Pentagon => "pentagon",
        }
    }

    /// One-letter formula symbol (C, Q, T, P).
    pub fn symbol(self) -> char {
        match self {
            Self::Circle => 'C',
            Self::Square => 'Q',
            Self::Triangle => 'T',
            Self::Pentagon => 'P',
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "circle" => Some(Self::Circle),
            "square" => Some(Self::Square),
            "triangle" => Some(Self::Triangle),
            "pentagon" => Some(Self::Pentagon),
            _ => None,
        }
    }

    /// Numeric shape code used by generation requests: 1 = circle … 4 = pentagon.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Circle),
            2 => Some(Self::Square),
            3 => Some(Self::Triangle),
            4 => Some(Self::Pentagon),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParticleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Particle sign. Only opposite polarities bond.
///
/// `Positive` orders before `Negative`, matching the character order of
/// `'+'` and `'-'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Polarity {
    #[serde(rename = "+")]
    Positive,
    #[serde(rename = "-")]
    Negative,
}

impl Polarity {
    pub fn symbol(self) -> char {
        match self {
            Self::Positive => '+',
            Self::Negative => '-',
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Self::Positive),
            "-" => Some(Self::Negative),
            _ => None,
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Default node type for a molecule graph.
///
/// `x` and `y` are integer display coordinates; they never affect chemical
/// validity and are rewritten by the [`layout`](crate::layout) pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Particle {
    /// Identifier, unique within one molecule.
    pub id: String,
    pub particle_type: ParticleType,
    pub polarity: Polarity,
    pub x: i32,
    pub y: i32,
}

impl Particle {
    pub fn new(id: impl Into<String>, particle_type: ParticleType, polarity: Polarity) -> Self {
        Self {
            id: id.into(),
            particle_type,
            polarity,
            x: 0,
            y: 0,
        }
    }

    /// `type` followed by the polarity sign, e.g. `square-`.
    pub fn signature(&self) -> String {
        format!("{}{}", self.particle_type, self.polarity)
    }
}

impl crate::traits::HasId for Particle {
    fn id(&self) -> &str {
        &self.id
    }
}

impl crate::traits::HasParticleType for Particle {
    fn particle_type(&self) -> ParticleType {
        self.particle_type
    }
}

impl crate::traits::HasPolarity for Particle {
    fn polarity(&self) -> Polarity {
        self.polarity
    }
}

impl crate::traits::HasPosition2D for Particle {
    fn position_2d(&self) -> [i32; 2] {
        [self.x, self.y]
    }

    fn set_position_2d(&mut self, pos: [i32; 2]) {
        self.x = pos[0];
        self.y = pos[1];
    }
}
