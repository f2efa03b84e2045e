// Command frames and the byte-at-a-time decoder
//
// Frame grammar (5 bytes, terminator included, no separators):
//   <motor><sign><hexHi><hexLo>\n
//   motor  w,x,y,z -> channel 3,0,1,2 (w is the irregular one)
//   sign   +,-     -> Forward, Reverse
//   hex    lowercase only, big nibble first
//
// Example: `x+0f\n` -> channel 0, forward, velocity 15.

/// Number of motor channels on the power stage.
pub const CHANNEL_COUNT: u8 = 4;

/// Bytes per command frame, terminator included.
pub const FRAME_LEN: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// A fully parsed command. Built only by the decoder and consumed
/// immediately by the dispatcher, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommand {
    /// Channel index, always below [`CHANNEL_COUNT`].
    pub channel: u8,
    pub direction: Direction,
    pub velocity: u8,
}

impl MotorCommand {
    /// Render the frame that parses back to this command. Only the
    /// sender-side tools encode; the runtime strictly decodes.
    pub fn encode(&self) -> [u8; FRAME_LEN as usize] {
        const SELECTORS: [u8; CHANNEL_COUNT as usize] = [b'x', b'y', b'z', b'w'];
        const HEX: &[u8; 16] = b"0123456789abcdef";

        let sign = match self.direction {
            Direction::Forward => b'+',
            Direction::Reverse => b'-',
        };
        [
            SELECTORS[self.channel as usize],
            sign,
            HEX[usize::from(self.velocity >> 4)],
            HEX[usize::from(self.velocity & 0x0F)],
            b'\n',
        ]
    }
}

/// Outcome of feeding one byte to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Complete(MotorCommand),
    InProgress,
    /// The byte did not match the class expected at `position`.
    /// The decoder has already reset itself.
    Invalid { position: u8 },
}

/// Five-position state machine over the frame grammar. Consumes one byte
/// per call, independent of how the caller batches its reads. Any byte
/// outside the class expected at the current position discards the partial
/// frame; the offending byte itself is never reinterpreted, so the stream
/// resynchronizes on the next valid motor selector.
#[derive(Debug, Default)]
pub struct CommandDecoder {
    position: u8,
    channel: u8,
    direction: Direction,
    velocity: u8,
}

impl CommandDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abandon any partial frame and return to the start position.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn feed(&mut self, byte: u8) -> Feed {
        let accepted = match self.position {
            0 => match byte {
                b'w' => {
                    self.channel = 3;
                    true
                }
                b'x'..=b'z' => {
                    self.channel = byte - b'x';
                    true
                }
                _ => false,
            },
            1 => match byte {
                b'+' => {
                    self.direction = Direction::Forward;
                    true
                }
                b'-' => {
                    self.direction = Direction::Reverse;
                    true
                }
                _ => false,
            },
            2 => match hex_nibble(byte) {
                Some(nibble) => {
                    self.velocity = nibble << 4;
                    true
                }
                None => false,
            },
            3 => match hex_nibble(byte) {
                Some(nibble) => {
                    self.velocity |= nibble;
                    true
                }
                None => false,
            },
            _ => byte == b'\n',
        };

        if !accepted {
            let position = self.position;
            self.reset();
            return Feed::Invalid { position };
        }

        self.position += 1;
        if self.position < FRAME_LEN {
            return Feed::InProgress;
        }

        let command = MotorCommand {
            channel: self.channel,
            direction: self.direction,
            velocity: self.velocity,
        };
        self.reset();
        Feed::Complete(command)
    }
}

/// Lowercase hex only, as the wire grammar requires.
fn hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(decoder: &mut CommandDecoder, frame: &[u8]) -> Vec<Feed> {
        frame.iter().map(|&b| decoder.feed(b)).collect()
    }

    fn decode_one(frame: &[u8]) -> Option<MotorCommand> {
        let mut decoder = CommandDecoder::new();
        decode(&mut decoder, frame)
            .into_iter()
            .find_map(|feed| match feed {
                Feed::Complete(cmd) => Some(cmd),
                _ => None,
            })
    }

    #[test]
    fn test_basic_frame() {
        let cmd = decode_one(b"x+0f\n").unwrap();
        assert_eq!(cmd.channel, 0);
        assert_eq!(cmd.direction, Direction::Forward);
        assert_eq!(cmd.velocity, 0x0F);
    }

    #[test]
    fn test_irregular_motor_selector() {
        // w maps to channel 3, not a plain offset
        assert_eq!(decode_one(b"w-ff\n").unwrap().channel, 3);
        assert_eq!(decode_one(b"x+00\n").unwrap().channel, 0);
        assert_eq!(decode_one(b"y+00\n").unwrap().channel, 1);
        assert_eq!(decode_one(b"z+00\n").unwrap().channel, 2);
    }

    #[test]
    fn test_reverse_full_speed() {
        let cmd = decode_one(b"w-ff\n").unwrap();
        assert_eq!(cmd.channel, 3);
        assert_eq!(cmd.direction, Direction::Reverse);
        assert_eq!(cmd.velocity, 255);
    }

    #[test]
    fn test_nibble_assembly() {
        let cmd = decode_one(b"y-a3\n").unwrap();
        assert_eq!(cmd.channel, 1);
        assert_eq!(cmd.direction, Direction::Reverse);
        assert_eq!(cmd.velocity, 0xA3);
    }

    #[test]
    fn test_intermediate_bytes_are_in_progress() {
        let mut decoder = CommandDecoder::new();
        let feeds = decode(&mut decoder, b"z+7e\n");
        assert_eq!(feeds[..4], [Feed::InProgress; 4]);
        assert!(matches!(feeds[4], Feed::Complete(_)));
    }

    #[test]
    fn test_uppercase_hex_rejected() {
        let mut decoder = CommandDecoder::new();
        decoder.feed(b'x');
        decoder.feed(b'+');
        assert_eq!(decoder.feed(b'A'), Feed::Invalid { position: 2 });
    }

    #[test]
    fn test_missing_terminator_rejected() {
        let mut decoder = CommandDecoder::new();
        let feeds = decode(&mut decoder, b"x+0fx");
        assert_eq!(feeds[4], Feed::Invalid { position: 4 });
    }

    #[test]
    fn test_invalid_reports_failed_position() {
        let mut decoder = CommandDecoder::new();
        assert_eq!(decoder.feed(b'q'), Feed::Invalid { position: 0 });
        decoder.feed(b'x');
        assert_eq!(decoder.feed(b'*'), Feed::Invalid { position: 1 });
    }

    #[test]
    fn test_garbage_never_completes() {
        let mut decoder = CommandDecoder::new();
        for feed in decode(&mut decoder, b"qqqq\n\n\n") {
            assert!(matches!(feed, Feed::Invalid { .. }));
        }
        // Parser is ready for a fresh frame as soon as a selector shows up
        let cmd = decode_one(b"x+0f\n").unwrap();
        assert_eq!(cmd.velocity, 0x0F);
    }

    #[test]
    fn test_offending_byte_not_reinterpreted() {
        // The 'x' that kills position 4 is swallowed, not treated as a
        // new motor selector, so the following '+' fails at position 0.
        let mut decoder = CommandDecoder::new();
        decode(&mut decoder, b"x+0fx");
        assert_eq!(decoder.feed(b'+'), Feed::Invalid { position: 0 });
    }

    #[test]
    fn test_back_to_back_frames_no_leakage() {
        let mut decoder = CommandDecoder::new();
        let mut commands = Vec::new();
        for &byte in b"x+0f\nx+0f\n" {
            if let Feed::Complete(cmd) = decoder.feed(byte) {
                commands.push(cmd);
            }
        }
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], commands[1]);
    }

    #[test]
    fn test_encode_matches_grammar() {
        let cmd = MotorCommand {
            channel: 3,
            direction: Direction::Reverse,
            velocity: 255,
        };
        assert_eq!(&cmd.encode(), b"w-ff\n");

        let cmd = MotorCommand {
            channel: 0,
            direction: Direction::Forward,
            velocity: 0x0F,
        };
        assert_eq!(&cmd.encode(), b"x+0f\n");
        assert_eq!(decode_one(&cmd.encode()), Some(cmd));
    }

    #[test]
    fn test_partial_frame_discarded_after_error() {
        let mut decoder = CommandDecoder::new();
        decode(&mut decoder, b"w-f");
        assert_eq!(decoder.feed(b'q'), Feed::Invalid { position: 3 });
        // The abandoned w/-/f partials must not bleed into the next frame
        let feeds = decode(&mut decoder, b"x+00\n");
        let cmd = match feeds[4] {
            Feed::Complete(cmd) => cmd,
            other => panic!("expected completion, got {:?}", other),
        };
        assert_eq!(cmd.channel, 0);
        assert_eq!(cmd.direction, Direction::Forward);
        assert_eq!(cmd.velocity, 0);
    }
}
