use std::{fs::File, io::{BufRead, BufReader}, mem::{self, MaybeUninit}, path::PathBuf};

use thiserror::Error;

/// Reads a run directory written by the encoder back into memory, one
/// frame at a time.
pub struct FluidDataDecoder {
    /// The path to the directory in which the fluid data resides.
    path: PathBuf,
    n: u32,
    num_frames: u64,
    current_frame: u64,
}

impl FluidDataDecoder {
    pub fn new(path: PathBuf) -> FluidDataDecoder {
        Self {
            path,
            n: 0,
            num_frames: 0,
            current_frame: 0,
        }
    }

    fn read_value<const N: usize, T, R: BufRead>(reader: &mut R) -> Result<T, DecodingError> {
        let mut bytes = [0; N];
        reader.read_exact(&mut bytes)?;

        let mut to: MaybeUninit<T> = MaybeUninit::uninit();

        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), to.as_mut_ptr().cast::<u8>(), N);
            Ok(to.assume_init())
        }
    }

    fn read_values<T, R: BufRead>(reader: &mut R, count: usize) -> Result<Vec<T>, DecodingError> {
        let mut bytes = vec![0; mem::size_of::<T>() * count];
        reader.read_exact(&mut bytes)?;

        Ok(bytes.chunks_exact(mem::size_of::<T>()).map(|b| {
            let mut to: MaybeUninit<T> = MaybeUninit::uninit();

            unsafe {
                std::ptr::copy_nonoverlapping(b.as_ptr(), to.as_mut_ptr().cast::<u8>(), mem::size_of::<T>());
                to.assume_init()
            }
        }).collect())
    }

    fn frame_path(&self, frame: u64) -> PathBuf {
        let max_digits = (self.num_frames - 1).checked_ilog10().unwrap_or(0) + 1;
        let zeros = max_digits - (frame.checked_ilog10().unwrap_or(0) + 1);

        self.path.join(format!("{}{frame}.dat", "0".repeat(zeros as usize)))
    }

    pub fn decode_metadata(&mut self) -> Result<FluidMetadata, DecodingError> {
        let path = self.path.join("_meta");
        let mut reader = BufReader::new(File::open(path)?);

        let n = Self::read_value::<4, u32, _>(&mut reader)?;
        let fps = Self::read_value::<4, u32, _>(&mut reader)?;
        let num_frames = Self::read_value::<8, u64, _>(&mut reader)?;
        let diffusion = Self::read_value::<4, f32, _>(&mut reader)?;
        let viscosity = Self::read_value::<4, f32, _>(&mut reader)?;

        self.n = n;
        self.num_frames = num_frames;

        Ok(FluidMetadata {
            n,
            fps,
            num_frames,
            diffusion,
            viscosity,
        })
    }

    pub fn decode_frame(&mut self) -> Result<Option<FluidFrameData>, DecodingError> {
        if self.current_frame >= self.num_frames {
            return Ok(None)
        }

        let cells = self.n as usize * self.n as usize;

        let path = self.frame_path(self.current_frame);
        let mut reader = BufReader::new(File::open(path)?);

        let density = Self::read_section(&mut reader, cells, 1)?;
        let velocity = Self::read_section(&mut reader, cells, 2)?;

        self.current_frame += 1;

        Ok(Some(FluidFrameData { density, velocity }))
    }

    fn read_section<R: BufRead>(reader: &mut R, cells: usize, dim: usize) -> Result<FluidDataArray, DecodingError> {
        let count = Self::read_value::<8, u64, _>(reader)? as usize;

        if count != cells {
            return Err(DecodingError::ShapeMismatch { expected: cells, got: count });
        }

        let values = Self::read_values::<f32, _>(reader, dim * count)?;

        Ok(FluidDataArray(values))
    }

    pub fn reset(&mut self) {
        self.current_frame = 0;
    }
}

pub struct FluidMetadata {
    pub n: u32,
    pub fps: u32,
    pub num_frames: u64,
    pub diffusion: f32,
    pub viscosity: f32,
}

/// One decoded frame: the interior density grid and the velocity grid,
/// both in the encoder's cell order.
pub struct FluidFrameData {
    pub density: FluidDataArray,
    pub velocity: FluidDataArray,
}

pub struct FluidDataArray(Vec<f32>);

impl FluidDataArray {
    pub fn iter<const D: usize>(&self) -> impl Iterator<Item = [f32; D]> + use<'_, D> {
        self.0.chunks_exact(D).map(|chunk| <[f32; D]>::try_from(chunk).unwrap())
    }

    pub fn get<const D: usize>(&self, i: usize) -> [f32; D] {
        self.0[D * i..D * i + D].try_into().unwrap()
    }

    /// Number of cells in the section, for values of dimension `D`.
    pub fn count<const D: usize>(&self) -> usize {
        self.0.len() / D
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum DecodingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("frame section holds {got} cells where {expected} were expected")]
    ShapeMismatch { expected: usize, got: usize },
}
