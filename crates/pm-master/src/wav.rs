//! WAV encoding for 8-bit unsigned mono PCM.

use std::io::Write;

const HEADER_LEN: usize = 44;

pub fn write_wav(w: &mut impl Write, samples: &[u8], sample_rate: u32) -> std::io::Result<()> {
    w.write_all(&header(samples.len() as u32, sample_rate))?;
    w.write_all(samples)?;
    if samples.len() % 2 == 1 {
        // RIFF chunks are word aligned
        w.write_all(&[0])?;
    }
    Ok(())
}

pub fn samples_to_wav(samples: &[u8], sample_rate: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + samples.len() + 1);
    buf.extend_from_slice(&header(samples.len() as u32, sample_rate));
    buf.extend_from_slice(samples);
    if samples.len() % 2 == 1 {
        buf.push(0);
    }
    buf
}

fn header(data_size: u32, sample_rate: u32) -> [u8; HEADER_LEN] {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 8;
    let block_align = num_channels * (bits_per_sample / 8);
    let padded = data_size + data_size % 2;

    let mut h = [0u8; HEADER_LEN];
    h[0..4].copy_from_slice(b"RIFF");
    h[4..8].copy_from_slice(&(36 + padded).to_le_bytes());
    h[8..12].copy_from_slice(b"WAVE");
    h[12..16].copy_from_slice(b"fmt ");
    h[16..20].copy_from_slice(&16u32.to_le_bytes());
    h[20..22].copy_from_slice(&1u16.to_le_bytes());
    h[22..24].copy_from_slice(&num_channels.to_le_bytes());
    h[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    h[28..32].copy_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    h[32..34].copy_from_slice(&block_align.to_le_bytes());
    h[34..36].copy_from_slice(&bits_per_sample.to_le_bytes());
    h[36..40].copy_from_slice(b"data");
    h[40..44].copy_from_slice(&data_size.to_le_bytes());
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
    }

    fn u16_at(buf: &[u8], at: usize) -> u16 {
        u16::from_le_bytes(buf[at..at + 2].try_into().unwrap())
    }

    #[test]
    fn header_fields() {
        let wav = samples_to_wav(&[128, 130, 126, 128], 22050);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 40);
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u16_at(&wav, 20), 1);
        assert_eq!(u16_at(&wav, 22), 1);
        assert_eq!(u32_at(&wav, 24), 22050);
        assert_eq!(u32_at(&wav, 28), 22050);
        assert_eq!(u16_at(&wav, 32), 1);
        assert_eq!(u16_at(&wav, 34), 8);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 4);
        assert_eq!(&wav[44..], [128, 130, 126, 128]);
    }

    #[test]
    fn odd_length_is_padded() {
        let wav = samples_to_wav(&[1, 2, 3], 22050);
        assert_eq!(wav.len(), 44 + 4);
        assert_eq!(u32_at(&wav, 40), 3);
        assert_eq!(u32_at(&wav, 4), 40);
    }

    #[test]
    fn writer_matches_buffer() {
        let samples = [9u8, 8, 7, 6, 5];
        let mut out = Vec::new();
        write_wav(&mut out, &samples, 11025).unwrap();
        assert_eq!(out, samples_to_wav(&samples, 11025));
    }
}
