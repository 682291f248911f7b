use crate::particle::{ParticleType, Polarity};

pub trait HasId {
    fn id(&self) -> &str;
}

pub trait HasParticleType {
    fn particle_type(&self) -> ParticleType;

    fn capacity(&self) -> u8 {
        self.particle_type().capacity()
    }
}

pub trait HasPolarity {
    fn polarity(&self) -> Polarity;
}

pub trait HasPosition2D {
    fn position_2d(&self) -> [i32; 2];
    fn set_position_2d(&mut self, pos: [i32; 2]);
}

pub trait HasMultiplicity {
    fn multiplicity(&self) -> u8;
}
