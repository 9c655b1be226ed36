/// RTCOfferOptions describes the options used to control the offer creation
/// process.
#[derive(Default, Debug, Clone)]
pub struct RTCOfferOptions {
    /// VoiceActivityDetection allows the application to provide information
    /// about whether it wishes voice detection feature to be enabled or
    /// disabled. Not acted upon.
    pub voice_activity_detection: bool,

    /// ICERestart forces the underlying ice gathering process to restart
    /// with fresh credentials before the offer is rendered.
    pub ice_restart: bool,
}

/// RTCAnswerOptions describes the options used to control the answer
/// creation process.
#[derive(Default, Debug, Clone)]
pub struct RTCAnswerOptions {
    /// VoiceActivityDetection allows the application to provide information
    /// about whether it wishes voice detection feature to be enabled or
    /// disabled. Not acted upon.
    pub voice_activity_detection: bool,
}
