use crate::cloth::types::FRAMES_IN_FLIGHT;

/// One context per frame in flight, picked by `frame_index % FRAMES_IN_FLIGHT`.
#[derive(Debug)]
pub struct FrameRing<T> {
    frames: [T; FRAMES_IN_FLIGHT],
}

impl<T> FrameRing<T> {
    pub fn new(mut build: impl FnMut(usize) -> T) -> Self {
        Self {
            frames: std::array::from_fn(|slot| build(slot)),
        }
    }

    pub fn slot(frame_index: usize) -> usize {
        frame_index % FRAMES_IN_FLIGHT
    }

    pub fn get(&self, frame_index: usize) -> &T {
        &self.frames[Self::slot(frame_index)]
    }

    pub fn get_mut(&mut self, frame_index: usize) -> &mut T {
        &mut self.frames[Self::slot(frame_index)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.frames.iter()
    }
}
