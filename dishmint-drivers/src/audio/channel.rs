use dishmint_core::config::{AudioConfig, MAX_FOLDER, MAX_TRACK, MAX_VOLUME};
use dishmint_core::traits::{AudioOutput, ChannelError};
use dishmint_protocol::audio::FrameReader;
use dishmint_protocol::{AudioCommand, ParsedFrame};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{with_timeout, Duration, Timer};
use embedded_io_async::{Read, Write};

/// Channel timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Quiet time after each command before the bus is released
    pub command_gap: Duration,
    /// Default bound for [`SerialCommandChannel::query_status`] and friends
    pub query_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::from(&AudioConfig::default())
    }
}

impl From<&AudioConfig> for ChannelConfig {
    fn from(config: &AudioConfig) -> Self {
        Self {
            command_gap: Duration::from_millis(config.command_gap_ms as u64),
            query_timeout: Duration::from_millis(config.query_timeout_ms as u64),
        }
    }
}

/// Exclusive command channel to the MP3 module
///
/// One command is in flight at a time: the port lives behind an async mutex
/// and a whole exchange (frame, optional reply, gap) happens under a single
/// lock.
pub struct SerialCommandChannel<M: RawMutex, P> {
    port: Mutex<M, P>,
    config: ChannelConfig,
}

impl<M: RawMutex, P: Read + Write> SerialCommandChannel<M, P> {
    pub fn new(port: P, config: ChannelConfig) -> Self {
        Self {
            port: Mutex::new(port),
            config,
        }
    }

    /// Give the port back
    pub fn into_port(self) -> P {
        self.port.into_inner()
    }

    /// Write a command without waiting for a reply
    pub async fn send(&self, command: AudioCommand) -> Result<(), ChannelError> {
        let mut port = self.port.lock().await;
        let result = write_frame(&mut *port, command).await;
        self.hold_gap().await;
        result
    }

    /// Write a command and wait up to `timeout` for the frame answering it
    ///
    /// Unsolicited reports and acks arriving meanwhile are discarded. An
    /// error report from the module ends the wait with
    /// [`ChannelError::Device`]. No retry on timeout.
    pub async fn query(
        &self,
        command: AudioCommand,
        timeout: Duration,
    ) -> Result<ParsedFrame, ChannelError> {
        let mut port = self.port.lock().await;
        let result = match write_frame(&mut *port, command).await {
            Ok(()) => with_timeout(timeout, read_reply(&mut *port, command.opcode()))
                .await
                .unwrap_or(Err(ChannelError::Timeout)),
            Err(e) => Err(e),
        };
        self.hold_gap().await;
        result
    }

    async fn hold_gap(&self) {
        if self.config.command_gap.as_ticks() > 0 {
            Timer::after(self.config.command_gap).await;
        }
    }

    /// Play a track; folder 0 addresses tracks by global index
    pub async fn play_track(&self, folder: u8, track: u16) -> Result<(), ChannelError> {
        if folder > MAX_FOLDER || track == 0 || track > MAX_TRACK {
            return Err(ChannelError::InvalidArgument);
        }
        let command = if folder == 0 {
            AudioCommand::PlayIndex(track)
        } else {
            AudioCommand::PlayFolderTrack {
                folder,
                track: track as u8,
            }
        };
        self.send(command).await
    }

    pub async fn set_volume(&self, volume: u8) -> Result<(), ChannelError> {
        if volume > MAX_VOLUME {
            return Err(ChannelError::InvalidArgument);
        }
        self.send(AudioCommand::SetVolume(volume)).await
    }

    pub async fn stop(&self) -> Result<(), ChannelError> {
        self.send(AudioCommand::Stop).await
    }

    pub async fn pause(&self) -> Result<(), ChannelError> {
        self.send(AudioCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<(), ChannelError> {
        self.send(AudioCommand::Resume).await
    }

    /// Playback status word (0 stopped, 1 playing, 2 paused)
    pub async fn query_status(&self) -> Result<u16, ChannelError> {
        let reply = self
            .query(AudioCommand::QueryStatus, self.config.query_timeout)
            .await?;
        Ok(reply.param())
    }

    pub async fn query_volume(&self) -> Result<u8, ChannelError> {
        let reply = self
            .query(AudioCommand::QueryVolume, self.config.query_timeout)
            .await?;
        Ok(reply.param2)
    }
}

impl<M: RawMutex, P: Read + Write> AudioOutput for SerialCommandChannel<M, P> {
    async fn play_track(&self, folder: u8, track: u16) -> Result<(), ChannelError> {
        SerialCommandChannel::play_track(self, folder, track).await
    }
}

async fn write_frame<P: Write>(port: &mut P, command: AudioCommand) -> Result<(), ChannelError> {
    let frame = command.to_frame(false);
    port.write_all(&frame).await.map_err(|_| ChannelError::Io)?;
    port.flush().await.map_err(|_| ChannelError::Io)
}

async fn read_reply<P: Read>(port: &mut P, opcode: u8) -> Result<ParsedFrame, ChannelError> {
    let mut reader = FrameReader::new();
    let mut buf = [0u8; 16];

    loop {
        let n = port.read(&mut buf).await.map_err(|_| ChannelError::Io)?;
        if n == 0 {
            return Err(ChannelError::Io);
        }

        for &byte in &buf[..n] {
            match reader.push(byte) {
                Some(Ok(frame)) if frame.opcode == opcode => return Ok(frame),
                Some(Ok(frame)) if frame.is_error() => {
                    return Err(ChannelError::Device(frame.param()))
                }
                // Track-finished reports, acks, stale replies
                Some(Ok(_)) => {}
                Some(Err(_e)) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("discarding audio frame: {}", _e);
                }
                None => {}
            }
        }
    }
}
