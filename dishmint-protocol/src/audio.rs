//! Serial frame codec for the MP3-TF-16P / DFPlayer Mini audio module.
//!
//! Every command and every report is a fixed 10-byte frame:
//!
//! ```text
//! ┌──────┬──────┬──────┬────────┬──────────┬────────┬────────┬──────┬──────┬──────┐
//! │ 0x7E │ 0xFF │ 0x06 │ OPCODE │ FEEDBACK │ PARAM1 │ PARAM2 │ CS_H │ CS_L │ 0xEF │
//! └──────┴──────┴──────┴────────┴──────────┴────────┴────────┴──────┴──────┴──────┘
//! ```
//!
//! The checksum is the 16-bit two's complement of the sum of bytes 1..=6,
//! transmitted big-endian. PARAM1/PARAM2 form a big-endian 16-bit argument.

/// Start marker
pub const FRAME_START: u8 = 0x7E;

/// Protocol version byte
pub const FRAME_VERSION: u8 = 0xFF;

/// Length byte (counts VERSION through PARAM2)
pub const FRAME_LENGTH: u8 = 0x06;

/// End marker
pub const FRAME_END: u8 = 0xEF;

/// Wire length of every frame
pub const FRAME_LEN: usize = 10;

/// Opcodes understood by the module
pub mod op {
    pub const NEXT: u8 = 0x01;
    pub const PREVIOUS: u8 = 0x02;
    pub const PLAY_INDEX: u8 = 0x03;
    pub const SET_VOLUME: u8 = 0x06;
    pub const RESET: u8 = 0x0C;
    pub const RESUME: u8 = 0x0D;
    pub const PAUSE: u8 = 0x0E;
    pub const PLAY_FOLDER_TRACK: u8 = 0x0F;
    pub const STOP: u8 = 0x16;
    pub const RANDOM: u8 = 0x18;
    pub const SINGLE_REPEAT: u8 = 0x19;

    // Reports sent by the module
    pub const CARD_INSERTED: u8 = 0x3A;
    pub const CARD_REMOVED: u8 = 0x3B;
    pub const USB_TRACK_FINISHED: u8 = 0x3C;
    pub const SD_TRACK_FINISHED: u8 = 0x3D;
    pub const FLASH_TRACK_FINISHED: u8 = 0x3E;
    pub const INITIALIZED: u8 = 0x3F;
    pub const ERROR: u8 = 0x40;
    pub const ACK: u8 = 0x41;

    // Queries
    pub const QUERY_STATUS: u8 = 0x42;
    pub const QUERY_VOLUME: u8 = 0x43;
}

/// Decoding failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// First byte is not 0x7E
    BadStart,
    /// Last byte is not 0xEF
    BadEnd,
    /// Recomputed checksum differs from the transmitted one
    ChecksumMismatch,
    /// Fewer than 10 bytes available
    Truncated,
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            FrameError::BadStart => "bad start marker",
            FrameError::BadEnd => "bad end marker",
            FrameError::ChecksumMismatch => "checksum mismatch",
            FrameError::Truncated => "truncated frame",
        };
        f.write_str(text)
    }
}

/// A decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParsedFrame {
    pub opcode: u8,
    pub param1: u8,
    pub param2: u8,
    pub feedback: bool,
}

impl ParsedFrame {
    pub const fn new(opcode: u8, param1: u8, param2: u8, feedback: bool) -> Self {
        Self {
            opcode,
            param1,
            param2,
            feedback,
        }
    }

    /// Build a frame from a 16-bit argument
    pub const fn with_param(opcode: u8, param: u16, feedback: bool) -> Self {
        Self::new(opcode, (param >> 8) as u8, param as u8, feedback)
    }

    /// PARAM1/PARAM2 as a big-endian 16-bit value
    pub const fn param(&self) -> u16 {
        ((self.param1 as u16) << 8) | self.param2 as u16
    }

    /// Unsolicited report (card events, track finished, power-up)
    pub fn is_notification(&self) -> bool {
        (op::CARD_INSERTED..=op::INITIALIZED).contains(&self.opcode)
    }

    /// Module error report; the code is in [`ParsedFrame::param`]
    pub fn is_error(&self) -> bool {
        self.opcode == op::ERROR
    }

    /// Acknowledgement of a command sent with feedback requested
    pub fn is_ack(&self) -> bool {
        self.opcode == op::ACK
    }

    pub fn encode(&self) -> [u8; FRAME_LEN] {
        encode(self.opcode, self.param1, self.param2, self.feedback)
    }
}

/// Checksum over the VERSION..=PARAM2 section of a frame
fn checksum_of(section: &[u8]) -> u16 {
    let sum = section
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
    0u16.wrapping_sub(sum)
}

/// Encode a command frame
pub fn encode(opcode: u8, param1: u8, param2: u8, feedback: bool) -> [u8; FRAME_LEN] {
    let mut frame = [
        FRAME_START,
        FRAME_VERSION,
        FRAME_LENGTH,
        opcode,
        feedback as u8,
        param1,
        param2,
        0,
        0,
        FRAME_END,
    ];
    let [hi, lo] = checksum_of(&frame[1..7]).to_be_bytes();
    frame[7] = hi;
    frame[8] = lo;
    frame
}

/// Decode the first 10 bytes of `bytes`
pub fn decode(bytes: &[u8]) -> Result<ParsedFrame, FrameError> {
    if bytes.len() < FRAME_LEN {
        return Err(FrameError::Truncated);
    }
    let frame = &bytes[..FRAME_LEN];

    if frame[0] != FRAME_START {
        return Err(FrameError::BadStart);
    }
    if frame[9] != FRAME_END {
        return Err(FrameError::BadEnd);
    }

    let received = u16::from_be_bytes([frame[7], frame[8]]);
    if checksum_of(&frame[1..7]) != received {
        return Err(FrameError::ChecksumMismatch);
    }

    Ok(ParsedFrame {
        opcode: frame[3],
        feedback: frame[4] != 0,
        param1: frame[5],
        param2: frame[6],
    })
}

/// Typed commands for the audio module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioCommand {
    Next,
    Previous,
    /// Play by global track index (1-based, SD card root order)
    PlayIndex(u16),
    /// Play `/NN/TTT.mp3`
    PlayFolderTrack { folder: u8, track: u8 },
    /// Volume 0-30
    SetVolume(u8),
    Pause,
    Resume,
    Stop,
    Random,
    /// Repeat the current track
    SingleRepeat(bool),
    Reset,
    QueryStatus,
    QueryVolume,
}

impl AudioCommand {
    pub fn opcode(&self) -> u8 {
        match self {
            AudioCommand::Next => op::NEXT,
            AudioCommand::Previous => op::PREVIOUS,
            AudioCommand::PlayIndex(_) => op::PLAY_INDEX,
            AudioCommand::PlayFolderTrack { .. } => op::PLAY_FOLDER_TRACK,
            AudioCommand::SetVolume(_) => op::SET_VOLUME,
            AudioCommand::Pause => op::PAUSE,
            AudioCommand::Resume => op::RESUME,
            AudioCommand::Stop => op::STOP,
            AudioCommand::Random => op::RANDOM,
            AudioCommand::SingleRepeat(_) => op::SINGLE_REPEAT,
            AudioCommand::Reset => op::RESET,
            AudioCommand::QueryStatus => op::QUERY_STATUS,
            AudioCommand::QueryVolume => op::QUERY_VOLUME,
        }
    }

    /// PARAM1, PARAM2
    pub fn params(&self) -> (u8, u8) {
        match *self {
            AudioCommand::PlayIndex(index) => ((index >> 8) as u8, index as u8),
            AudioCommand::PlayFolderTrack { folder, track } => (folder, track),
            AudioCommand::SetVolume(volume) => (0, volume),
            AudioCommand::SingleRepeat(on) => (0, on as u8),
            _ => (0, 0),
        }
    }

    /// Commands the module answers with a frame of the same opcode
    pub fn is_query(&self) -> bool {
        matches!(self, AudioCommand::QueryStatus | AudioCommand::QueryVolume)
    }

    pub fn to_frame(&self, feedback: bool) -> [u8; FRAME_LEN] {
        let (param1, param2) = self.params();
        encode(self.opcode(), param1, param2, feedback)
    }
}

/// Incremental reader that resynchronises on the start marker
///
/// Bytes are pushed one at a time. Garbage before a start marker is skipped
/// silently; a complete but corrupt frame is reported once and the reader
/// rescans the bytes it already holds for the next start marker.
#[derive(Debug, Clone)]
pub struct FrameReader {
    buf: [u8; FRAME_LEN],
    len: usize,
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader {
    pub const fn new() -> Self {
        Self {
            buf: [0; FRAME_LEN],
            len: 0,
        }
    }

    /// Feed one byte
    ///
    /// Returns `Some` once ten bytes starting with 0x7E have been collected.
    pub fn push(&mut self, byte: u8) -> Option<Result<ParsedFrame, FrameError>> {
        if self.len == 0 && byte != FRAME_START {
            return None;
        }

        self.buf[self.len] = byte;
        self.len += 1;
        if self.len < FRAME_LEN {
            return None;
        }

        let result = decode(&self.buf);
        if result.is_ok() {
            self.len = 0;
        } else {
            self.resync();
        }
        Some(result)
    }

    /// Drop the leading start marker and slide to the next candidate one
    fn resync(&mut self) {
        match self.buf[1..].iter().position(|&b| b == FRAME_START) {
            Some(pos) => {
                let from = pos + 1;
                self.buf.copy_within(from.., 0);
                self.len = FRAME_LEN - from;
            }
            None => self.len = 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_play_track_3() {
        // Player 1 jingle on the original device
        let frame = AudioCommand::PlayIndex(3).to_frame(false);
        assert_eq!(
            frame,
            [0x7E, 0xFF, 0x06, 0x03, 0x00, 0x00, 0x03, 0xFE, 0xF5, 0xEF]
        );
    }

    #[test]
    fn test_encode_set_volume() {
        let frame = AudioCommand::SetVolume(20).to_frame(false);
        // 0 - (0xFF + 0x06 + 0x06 + 0x14) = 0xFEE1
        assert_eq!(&frame[3..], &[0x06, 0x00, 0x00, 0x14, 0xFE, 0xE1, 0xEF]);
    }

    #[test]
    fn test_feedback_flag_affects_checksum() {
        let without = encode(op::STOP, 0, 0, false);
        let with = encode(op::STOP, 0, 0, true);
        assert_eq!(with[4], 0x01);
        assert_ne!(without[7..9], with[7..9]);
        assert!(decode(&with).unwrap().feedback);
    }

    #[test]
    fn test_decode_truncated() {
        let frame = encode(op::NEXT, 0, 0, false);
        assert_eq!(decode(&frame[..9]), Err(FrameError::Truncated));
        assert_eq!(decode(&[]), Err(FrameError::Truncated));
    }

    #[test]
    fn test_decode_bad_markers() {
        let mut frame = encode(op::NEXT, 0, 0, false);
        frame[0] = 0x00;
        assert_eq!(decode(&frame), Err(FrameError::BadStart));

        let mut frame = encode(op::NEXT, 0, 0, false);
        frame[9] = 0x00;
        assert_eq!(decode(&frame), Err(FrameError::BadEnd));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut bytes = [0u8; 14];
        bytes[..10].copy_from_slice(&encode(op::QUERY_VOLUME, 0, 17, false));
        let parsed = decode(&bytes).unwrap();
        assert_eq!(parsed.opcode, op::QUERY_VOLUME);
        assert_eq!(parsed.param(), 17);
    }

    #[test]
    fn test_report_classification() {
        assert!(ParsedFrame::new(op::SD_TRACK_FINISHED, 0, 3, false).is_notification());
        assert!(ParsedFrame::new(op::ERROR, 0, 2, false).is_error());
        assert!(ParsedFrame::new(op::ACK, 0, 0, false).is_ack());
        assert!(!ParsedFrame::new(op::QUERY_STATUS, 0, 1, false).is_notification());
    }

    #[test]
    fn test_folder_track_params() {
        let cmd = AudioCommand::PlayFolderTrack { folder: 2, track: 7 };
        assert_eq!(cmd.opcode(), op::PLAY_FOLDER_TRACK);
        assert_eq!(cmd.params(), (2, 7));
        assert!(!cmd.is_query());
        assert!(AudioCommand::QueryStatus.is_query());
    }

    #[test]
    fn test_reader_skips_garbage() {
        let frame = encode(op::QUERY_STATUS, 0x02, 0x01, false);
        let mut reader = FrameReader::new();

        for b in [0x00, 0x13, 0xEF] {
            assert!(reader.push(b).is_none());
        }
        let mut out = None;
        for &b in &frame {
            out = reader.push(b);
        }
        let parsed = out.unwrap().unwrap();
        assert_eq!(parsed.opcode, op::QUERY_STATUS);
        assert_eq!(parsed.param(), 0x0201);
    }

    #[test]
    fn test_reader_recovers_after_corrupt_frame() {
        // A truncated frame followed directly by a good one
        let good = encode(op::QUERY_VOLUME, 0, 25, false);
        let mut stream = [0u8; 15];
        stream[..5].copy_from_slice(&good[..5]);
        stream[5..].copy_from_slice(&good);

        let mut reader = FrameReader::new();
        let mut results = heapless::Vec::<Result<ParsedFrame, FrameError>, 4>::new();
        for &b in &stream {
            if let Some(r) = reader.push(b) {
                results.push(r).unwrap();
            }
        }

        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert_eq!(results[1].unwrap().param(), 25);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(opcode: u8, param1: u8, param2: u8, feedback: bool) {
            let frame = encode(opcode, param1, param2, feedback);
            let parsed = decode(&frame).unwrap();
            prop_assert_eq!(parsed, ParsedFrame::new(opcode, param1, param2, feedback));
        }

        #[test]
        fn prop_single_byte_flip_is_rejected(
            opcode: u8,
            param1: u8,
            param2: u8,
            feedback: bool,
            index in 1usize..9,
            flip in 1u8..=255,
        ) {
            let mut frame = encode(opcode, param1, param2, feedback);
            frame[index] ^= flip;
            prop_assert_eq!(decode(&frame), Err(FrameError::ChecksumMismatch));
        }

        #[test]
        fn prop_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..24)) {
            let _ = decode(&bytes);
            let mut reader = FrameReader::new();
            for b in bytes {
                let _ = reader.push(b);
            }
        }
    }
}
