//! The peer connection actor and its public handle.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use log::{trace, warn};
use sdp::description::media::MediaDescription;
use sdp::util::ConnectionRole;
use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};
use crate::ice_transport::ice_candidate::RTCIceCandidateInit;
use crate::ice_transport::ice_role::RTCIceRole;
use crate::ice_transport::{IceAgent, IceAgentEvent};
use crate::jitter_buffer::{JitterBuffer, DEFAULT_LATENCY};
use crate::media_stream::MediaStreamTrack;
use crate::peer_connection::certificate::RTCCertificate;
use crate::peer_connection::configuration::RTCConfiguration;
use crate::peer_connection::event_handler::{NoopEventHandler, PeerConnectionEventHandler};
use crate::peer_connection::offer_answer_options::{RTCAnswerOptions, RTCOfferOptions};
use crate::peer_connection::peer_connection_state::RTCPeerConnectionState;
use crate::peer_connection::sdp::sdp_type::RTCSdpType;
use crate::peer_connection::sdp::session_description::RTCSessionDescription;
use crate::peer_connection::sdp::{
    extract_fingerprint, extract_ice_details, media_description_with, media_direction, media_mid,
    media_ssrcs, media_stream_ids, offer_media_description, populate_session_description,
    SessionParams,
};
use crate::peer_connection::signaling_state::{
    check_next_signaling_state, next_signaling_state, RTCSignalingState, StateChangeOp,
};
use crate::rtp_transceiver::rtp_codec::RTPCodecType;
use crate::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use crate::rtp_transceiver::{RTCRtpTransceiver, RTCRtpTransceiverInit, SSRC};

const OPERATIONS_CAPACITY: usize = 64;

/// Requests processed serially by the owning task. Replies are delivered on
/// oneshot channels; a caller abandoning its reply does not abort the
/// operation.
enum Operation {
    CreateOffer {
        options: Option<RTCOfferOptions>,
        reply: oneshot::Sender<Result<RTCSessionDescription>>,
    },
    CreateAnswer {
        options: Option<RTCAnswerOptions>,
        reply: oneshot::Sender<Result<RTCSessionDescription>>,
    },
    SetLocalDescription {
        desc: RTCSessionDescription,
        reply: oneshot::Sender<Result<()>>,
    },
    SetRemoteDescription {
        desc: RTCSessionDescription,
        reply: oneshot::Sender<Result<()>>,
    },
    AddIceCandidate {
        candidate: RTCIceCandidateInit,
        reply: oneshot::Sender<Result<()>>,
    },
    AddTrack {
        track: MediaStreamTrack,
        reply: oneshot::Sender<Result<RTCRtpTransceiver>>,
    },
    StopTransceiver {
        mid: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Transceivers {
        reply: oneshot::Sender<Vec<RTCRtpTransceiver>>,
    },
    SignalingState {
        reply: oneshot::Sender<RTCSignalingState>,
    },
    ConnectionState {
        reply: oneshot::Sender<RTCPeerConnectionState>,
    },
    LocalDescription {
        reply: oneshot::Sender<Option<RTCSessionDescription>>,
    },
    RemoteDescription {
        reply: oneshot::Sender<Option<RTCSessionDescription>>,
    },
    ReceiveRtp {
        packet: rtp::packet::Packet,
    },
    Close {
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Builder for [`PeerConnection`]. The ICE agent is a required collaborator;
/// the event handler defaults to a no-op.
pub struct PeerConnectionBuilder {
    config: RTCConfiguration,
    handler: Option<Arc<dyn PeerConnectionEventHandler>>,
    ice_agent: Option<(
        Arc<dyn IceAgent>,
        mpsc::UnboundedReceiver<IceAgentEvent>,
    )>,
}

impl PeerConnectionBuilder {
    pub fn new(config: RTCConfiguration) -> Self {
        PeerConnectionBuilder {
            config,
            handler: None,
            ice_agent: None,
        }
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn PeerConnectionEventHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn with_ice_agent(
        mut self,
        agent: Arc<dyn IceAgent>,
        events: mpsc::UnboundedReceiver<IceAgentEvent>,
    ) -> Self {
        self.ice_agent = Some((agent, events));
        self
    }

    /// Validates the configuration, starts the ICE agent in the controlled
    /// role seeded with the configured STUN servers, and spawns the owning
    /// task. Must be called within a tokio runtime.
    pub fn start(self) -> Result<PeerConnection> {
        self.config.validate()?;

        let (ice_agent, ice_events) = self.ice_agent.ok_or(Error::ErrICEAgentNotExist)?;
        ice_agent.start(RTCIceRole::Controlled, self.config.stun_urls())?;

        let handler = self
            .handler
            .unwrap_or_else(|| Arc::new(NoopEventHandler));
        let certificate = self
            .config
            .certificates()
            .first()
            .cloned()
            .unwrap_or_else(RTCCertificate::generate);

        let (tx, rx) = mpsc::channel(OPERATIONS_CAPACITY);
        let inner = PeerConnectionInner {
            config: self.config,
            certificate,
            handler,
            ice_agent,
            signaling_state: RTCSignalingState::Stable,
            connection_state: RTCPeerConnectionState::New,
            current_local_description: None,
            pending_local_description: None,
            current_remote_description: None,
            pending_remote_description: None,
            transceivers: vec![],
            receive_routes: HashMap::new(),
            next_mid: 0,
            session_id: rand::random::<u64>(),
            session_version: 0,
            closed: false,
        };
        tokio::spawn(inner.run(rx, ice_events));

        Ok(PeerConnection { operations: tx })
    }
}

/// Handle onto a running peer connection.
///
/// All operations suspend the caller until the owning task replies; replies
/// come back in issue order. Once the connection is closed every operation
/// fails with [`Error::ErrConnectionClosed`].
#[derive(Clone)]
pub struct PeerConnection {
    operations: mpsc::Sender<Operation>,
}

impl PeerConnection {
    async fn request<T>(
        &self,
        op: Operation,
        rx: oneshot::Receiver<T>,
    ) -> Result<T> {
        self.operations
            .send(op)
            .await
            .map_err(|_| Error::ErrConnectionClosed)?;
        rx.await.map_err(|_| Error::ErrConnectionClosed)
    }

    /// Creates an SDP offer describing the current set of transceivers,
    /// assigning mids to transceivers that have none yet.
    pub async fn create_offer(
        &self,
        options: Option<RTCOfferOptions>,
    ) -> Result<RTCSessionDescription> {
        let (reply, rx) = oneshot::channel();
        self.request(Operation::CreateOffer { options, reply }, rx)
            .await?
    }

    /// Creates an SDP answer mirroring the remote offer's media sections.
    /// Only valid in the have-remote-offer and have-local-pranswer states.
    pub async fn create_answer(
        &self,
        options: Option<RTCAnswerOptions>,
    ) -> Result<RTCSessionDescription> {
        let (reply, rx) = oneshot::channel();
        self.request(Operation::CreateAnswer { options, reply }, rx)
            .await?
    }

    /// Applies a local description, driving the signaling state machine.
    pub async fn set_local_description(&self, desc: RTCSessionDescription) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(Operation::SetLocalDescription { desc, reply }, rx)
            .await?
    }

    /// Applies a remote description, driving the signaling state machine and
    /// configuring the ICE agent with the remote credentials.
    pub async fn set_remote_description(&self, desc: RTCSessionDescription) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(Operation::SetRemoteDescription { desc, reply }, rx)
            .await?
    }

    /// Forwards a remote ICE candidate to the agent.
    pub async fn add_ice_candidate(&self, candidate: RTCIceCandidateInit) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(Operation::AddIceCandidate { candidate, reply }, rx)
            .await?
    }

    /// Adds a send track, creating a sendrecv transceiver for it. Returns a
    /// snapshot of the created transceiver.
    pub async fn add_track(&self, track: MediaStreamTrack) -> Result<RTCRtpTransceiver> {
        let (reply, rx) = oneshot::channel();
        self.request(Operation::AddTrack { track, reply }, rx)
            .await?
    }

    /// Stops the transceiver with the given mid. Stopped transceivers keep
    /// their mid and stay in the connection's list, but no longer send or
    /// receive; they offer inactive on the next negotiation.
    pub async fn stop_transceiver(&self, mid: String) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(Operation::StopTransceiver { mid, reply }, rx)
            .await?
    }

    /// Snapshots of the connection's transceivers, in m-line order.
    pub async fn transceivers(&self) -> Result<Vec<RTCRtpTransceiver>> {
        let (reply, rx) = oneshot::channel();
        self.request(Operation::Transceivers { reply }, rx).await
    }

    pub async fn signaling_state(&self) -> Result<RTCSignalingState> {
        let (reply, rx) = oneshot::channel();
        self.request(Operation::SignalingState { reply }, rx).await
    }

    pub async fn connection_state(&self) -> Result<RTCPeerConnectionState> {
        let (reply, rx) = oneshot::channel();
        self.request(Operation::ConnectionState { reply }, rx).await
    }

    /// The pending local description if one is in flight, otherwise the
    /// current one.
    pub async fn local_description(&self) -> Result<Option<RTCSessionDescription>> {
        let (reply, rx) = oneshot::channel();
        self.request(Operation::LocalDescription { reply }, rx).await
    }

    /// The pending remote description if one is in flight, otherwise the
    /// current one.
    pub async fn remote_description(&self) -> Result<Option<RTCSessionDescription>> {
        let (reply, rx) = oneshot::channel();
        self.request(Operation::RemoteDescription { reply }, rx).await
    }

    /// Feeds an inbound RTP packet to the media plane. Packets are routed by
    /// SSRC into the owning track's jitter buffer; releases surface as `rtp`
    /// events on the handler.
    pub async fn receive_rtp(&self, packet: rtp::packet::Packet) -> Result<()> {
        self.operations
            .send(Operation::ReceiveRtp { packet })
            .await
            .map_err(|_| Error::ErrConnectionClosed)
    }

    /// Closes the connection: stops the ICE agent, drops transceivers and
    /// routes, and fails all subsequent operations with `ErrConnectionClosed`.
    pub async fn close(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(Operation::Close { reply }, rx).await?
    }
}

/// A media-plane route from an inbound SSRC to its track's jitter buffer.
struct ReceiveRoute {
    track_id: String,
    jitter: JitterBuffer,
    deadline: Option<Instant>,
}

struct PeerConnectionInner {
    config: RTCConfiguration,
    certificate: RTCCertificate,
    handler: Arc<dyn PeerConnectionEventHandler>,
    ice_agent: Arc<dyn IceAgent>,
    signaling_state: RTCSignalingState,
    connection_state: RTCPeerConnectionState,
    current_local_description: Option<RTCSessionDescription>,
    pending_local_description: Option<RTCSessionDescription>,
    current_remote_description: Option<RTCSessionDescription>,
    pending_remote_description: Option<RTCSessionDescription>,
    transceivers: Vec<RTCRtpTransceiver>,
    receive_routes: HashMap<SSRC, ReceiveRoute>,
    next_mid: u32,
    session_id: u64,
    session_version: u64,
    closed: bool,
}

impl PeerConnectionInner {
    async fn run(
        mut self,
        mut operations: mpsc::Receiver<Operation>,
        mut ice_events: mpsc::UnboundedReceiver<IceAgentEvent>,
    ) {
        let mut ice_events_open = true;
        loop {
            let media_deadline = self.next_media_deadline();
            tokio::select! {
                op = operations.recv() => {
                    match op {
                        Some(op) => {
                            if self.handle_operation(op).await {
                                break;
                            }
                        }
                        // Every handle is gone; nobody can observe us anymore.
                        None => break,
                    }
                }
                event = ice_events.recv(), if ice_events_open => {
                    match event {
                        Some(event) => self.handle_ice_event(event).await,
                        None => ice_events_open = false,
                    }
                }
                _ = tokio::time::sleep_until(tokio::time::Instant::from_std(
                    media_deadline.unwrap_or_else(Instant::now),
                )), if media_deadline.is_some() => {
                    self.handle_media_timeout(Instant::now()).await;
                }
            }
        }

        if !self.closed {
            if let Err(err) = self.ice_agent.close() {
                warn!("closing ice agent: {err}");
            }
        }
    }

    /// Returns true when the owning task should shut down.
    async fn handle_operation(&mut self, op: Operation) -> bool {
        match op {
            Operation::CreateOffer { options, reply } => {
                let _ = reply.send(self.create_offer(options));
            }
            Operation::CreateAnswer { options, reply } => {
                let _ = reply.send(self.create_answer(options));
            }
            Operation::SetLocalDescription { desc, reply } => {
                let result = self.set_local_description(desc).await;
                let _ = reply.send(result);
            }
            Operation::SetRemoteDescription { desc, reply } => {
                let result = self.set_remote_description(desc).await;
                let _ = reply.send(result);
            }
            Operation::AddIceCandidate { candidate, reply } => {
                let _ = reply.send(self.add_ice_candidate(candidate));
            }
            Operation::AddTrack { track, reply } => {
                let _ = reply.send(self.add_track(track));
            }
            Operation::StopTransceiver { mid, reply } => {
                let _ = reply.send(self.stop_transceiver(&mid));
            }
            Operation::Transceivers { reply } => {
                let _ = reply.send(self.transceivers.clone());
            }
            Operation::SignalingState { reply } => {
                let _ = reply.send(self.signaling_state);
            }
            Operation::ConnectionState { reply } => {
                let _ = reply.send(self.connection_state);
            }
            Operation::LocalDescription { reply } => {
                let _ = reply.send(
                    self.pending_local_description
                        .clone()
                        .or_else(|| self.current_local_description.clone()),
                );
            }
            Operation::RemoteDescription { reply } => {
                let _ = reply.send(self.remote_description());
            }
            Operation::ReceiveRtp { packet } => {
                self.handle_rtp(packet).await;
            }
            Operation::Close { reply } => {
                let result = self.close().await;
                let _ = reply.send(result);
                return true;
            }
        }
        false
    }

    fn remote_description(&self) -> Option<RTCSessionDescription> {
        self.pending_remote_description
            .clone()
            .or_else(|| self.current_remote_description.clone())
    }

    fn session_params(&self, setup: ConnectionRole) -> Result<SessionParams> {
        let credentials = self.ice_agent.local_credentials()?;
        let fingerprint = self.certificate.fingerprint();
        Ok(SessionParams {
            ice_ufrag: credentials.ufrag,
            ice_pwd: credentials.pwd,
            ice_options: "trickle".to_owned(),
            fingerprint_algorithm: fingerprint.algorithm.clone(),
            fingerprint_value: fingerprint.value.clone(),
            setup,
            header_extensions: self.config.header_extensions().to_vec(),
        })
    }

    fn create_offer(
        &mut self,
        options: Option<RTCOfferOptions>,
    ) -> Result<RTCSessionDescription> {
        if self.closed {
            return Err(Error::ErrConnectionClosed);
        }

        if options.map(|o| o.ice_restart).unwrap_or_default() {
            self.ice_agent.restart()?;
        }

        for i in 0..self.transceivers.len() {
            if self.transceivers[i].mid().is_none() {
                let mid = self.next_mid.to_string();
                self.next_mid += 1;
                self.transceivers[i].set_mid(mid);
            }
        }

        let params = self.session_params(ConnectionRole::Actpass)?;
        let mids: Vec<String> = self
            .transceivers
            .iter()
            .filter_map(|t| t.mid().map(str::to_owned))
            .collect();
        let media: Vec<MediaDescription> = self
            .transceivers
            .iter()
            .map(|t| offer_media_description(t, &params))
            .collect();

        self.session_version += 1;
        let sd = populate_session_description(self.session_id, self.session_version, &mids, media);

        RTCSessionDescription::offer(sd.marshal())
    }

    fn create_answer(
        &mut self,
        _options: Option<RTCAnswerOptions>,
    ) -> Result<RTCSessionDescription> {
        if self.closed {
            return Err(Error::ErrConnectionClosed);
        }
        if !matches!(
            self.signaling_state,
            RTCSignalingState::HaveRemoteOffer | RTCSignalingState::HaveLocalPranswer
        ) {
            return Err(Error::ErrIncorrectSignalingState);
        }

        let remote = self
            .remote_description()
            .ok_or(Error::ErrPeerConnRemoteDescriptionNil)?;
        let parsed = match remote.parsed {
            Some(parsed) => parsed,
            None => remote.unmarshal()?,
        };

        let params = self.session_params(ConnectionRole::Active)?;
        let mut mids = Vec::with_capacity(parsed.media_descriptions.len());
        let mut media = Vec::with_capacity(parsed.media_descriptions.len());

        for remote_media in &parsed.media_descriptions {
            let idx = self.find_transceiver_for_media(remote_media)?;
            let t = &self.transceivers[idx];
            let mid = t.mid().unwrap_or_default().to_owned();

            // Intersect our intent with the remote direction seen from our
            // side; an empty intersection answers inactive.
            let direction = t
                .direction()
                .intersect(media_direction(remote_media).reverse());

            media.push(media_description_with(t, &mid, direction, &params));
            mids.push(mid);
        }

        self.session_version += 1;
        let sd = populate_session_description(self.session_id, self.session_version, &mids, media);

        RTCSessionDescription::answer(sd.marshal())
    }

    async fn set_local_description(&mut self, desc: RTCSessionDescription) -> Result<()> {
        if self.closed {
            return Err(Error::ErrConnectionClosed);
        }

        let op = StateChangeOp::SetLocal;

        if desc.sdp_type == RTCSdpType::Rollback {
            let next = check_next_signaling_state(
                self.signaling_state,
                RTCSignalingState::Stable,
                op,
                RTCSdpType::Rollback,
            )?;
            self.pending_local_description = None;
            self.update_signaling_state(next).await;
            return Ok(());
        }

        // Reject malformed SDP before touching any state.
        if desc.parsed.is_none() {
            desc.unmarshal()?;
        }

        let next = next_signaling_state(self.signaling_state, op, desc.sdp_type);
        let next = check_next_signaling_state(self.signaling_state, next, op, desc.sdp_type)?;

        match desc.sdp_type {
            RTCSdpType::Offer | RTCSdpType::Pranswer => {
                self.pending_local_description = Some(desc);
            }
            RTCSdpType::Answer => {
                self.current_local_description = Some(desc);
                self.current_remote_description = self.pending_remote_description.take();
                self.pending_local_description = None;
            }
            _ => {}
        }

        self.ice_agent.gather_candidates()?;
        self.update_signaling_state(next).await;
        Ok(())
    }

    async fn set_remote_description(&mut self, desc: RTCSessionDescription) -> Result<()> {
        if self.closed {
            return Err(Error::ErrConnectionClosed);
        }

        let op = StateChangeOp::SetRemote;

        if desc.sdp_type == RTCSdpType::Rollback {
            let next = check_next_signaling_state(
                self.signaling_state,
                RTCSignalingState::Stable,
                op,
                RTCSdpType::Rollback,
            )?;
            self.pending_remote_description = None;
            self.update_signaling_state(next).await;
            return Ok(());
        }

        let parsed = match &desc.parsed {
            Some(parsed) => parsed.clone(),
            None => desc.unmarshal()?,
        };

        let next = next_signaling_state(self.signaling_state, op, desc.sdp_type);
        let next = check_next_signaling_state(self.signaling_state, next, op, desc.sdp_type)?;

        let (ufrag, pwd) = extract_ice_details(&parsed)?;
        extract_fingerprint(&parsed)?;
        self.ice_agent.set_remote_credentials(ufrag, pwd)?;
        self.ice_agent.gather_candidates()?;

        for remote_media in &parsed.media_descriptions {
            self.apply_remote_media(remote_media).await?;
        }

        match desc.sdp_type {
            RTCSdpType::Offer | RTCSdpType::Pranswer => {
                self.pending_remote_description = Some(desc);
            }
            RTCSdpType::Answer => {
                self.current_remote_description = Some(desc);
                self.current_local_description = self.pending_local_description.take();
                self.pending_remote_description = None;
            }
            _ => {}
        }

        self.update_signaling_state(next).await;
        Ok(())
    }

    /// Finds the transceiver matching a remote media section by mid.
    fn find_transceiver_for_media(&self, media: &MediaDescription) -> Result<usize> {
        let mid = media_mid(media).ok_or(Error::ErrPeerConnRemoteDescriptionWithoutMidValue)?;
        self.transceivers
            .iter()
            .position(|t| t.mid() == Some(mid))
            .ok_or_else(|| Error::ErrOthers(format!("no transceiver for mid {mid}")))
    }

    /// Matches a remote media section to a transceiver by mid, creating a
    /// recvonly transceiver when none exists, and wires up the receive side
    /// when the remote intends to send.
    async fn apply_remote_media(&mut self, media: &MediaDescription) -> Result<()> {
        let mid = media_mid(media)
            .ok_or(Error::ErrPeerConnRemoteDescriptionWithoutMidValue)?
            .to_owned();
        let kind = RTPCodecType::from(media.media_name.media.as_str());

        let idx = match self.transceivers.iter().position(|t| t.mid() == Some(&*mid)) {
            Some(idx) => idx,
            None => {
                let mut t = RTCRtpTransceiver::new(
                    kind,
                    None,
                    &self.config,
                    RTCRtpTransceiverInit {
                        direction: RTCRtpTransceiverDirection::Recvonly,
                        ..Default::default()
                    },
                )?;
                t.set_mid(mid.clone());
                // Keep locally generated mids clear of numeric remote ones.
                if let Ok(n) = mid.parse::<u32>() {
                    if n >= self.next_mid {
                        self.next_mid = n + 1;
                    }
                }
                self.transceivers.push(t);
                self.transceivers.len() - 1
            }
        };

        if !media_direction(media).has_send() {
            return Ok(());
        }

        let ssrcs = media_ssrcs(media);
        let existing_track = self.transceivers[idx].receiver().track().cloned();
        let track = match existing_track {
            Some(track) => track,
            None => {
                let track = MediaStreamTrack::new(kind, media_stream_ids(media));
                let receiver = self.transceivers[idx].receiver_mut();
                receiver.track = Some(track.clone());
                receiver.ssrc = ssrcs.first().copied();
                self.handler.on_track(track.clone()).await;
                track
            }
        };

        for ssrc in ssrcs {
            self.receive_routes
                .entry(ssrc)
                .or_insert_with(|| ReceiveRoute {
                    track_id: track.id().to_owned(),
                    jitter: JitterBuffer::new(DEFAULT_LATENCY),
                    deadline: None,
                });
        }

        Ok(())
    }

    fn add_ice_candidate(&mut self, candidate: RTCIceCandidateInit) -> Result<()> {
        if self.closed {
            return Err(Error::ErrConnectionClosed);
        }
        self.ice_agent
            .add_remote_candidate(candidate.attribute().to_owned())
    }

    fn add_track(&mut self, track: MediaStreamTrack) -> Result<RTCRtpTransceiver> {
        if self.closed {
            return Err(Error::ErrConnectionClosed);
        }
        let t = RTCRtpTransceiver::new(
            track.kind(),
            Some(track),
            &self.config,
            RTCRtpTransceiverInit::default(),
        )?;
        self.transceivers.push(t.clone());
        Ok(t)
    }

    fn stop_transceiver(&mut self, mid: &str) -> Result<()> {
        if self.closed {
            return Err(Error::ErrConnectionClosed);
        }
        let t = self
            .transceivers
            .iter_mut()
            .find(|t| t.mid() == Some(mid))
            .ok_or_else(|| Error::ErrOthers(format!("no transceiver for mid {mid}")))?;
        t.stop();
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.signaling_state = RTCSignalingState::Closed;

        if let Err(err) = self.ice_agent.close() {
            warn!("closing ice agent: {err}");
        }

        self.transceivers.clear();
        self.receive_routes.clear();
        self.update_connection_state(RTCPeerConnectionState::Closed)
            .await;
        Ok(())
    }

    async fn handle_ice_event(&mut self, event: IceAgentEvent) {
        match event {
            IceAgentEvent::NewCandidate(attr) => {
                if self.closed {
                    return;
                }
                let sdp_mid = self
                    .transceivers
                    .first()
                    .and_then(|t| t.mid().map(str::to_owned))
                    .unwrap_or_else(|| "0".to_owned());
                let username_fragment = self
                    .ice_agent
                    .local_credentials()
                    .ok()
                    .map(|c| c.ufrag);
                let candidate = RTCIceCandidateInit {
                    candidate: format!("candidate:{attr}"),
                    sdp_mid: Some(sdp_mid),
                    sdp_mline_index: Some(0),
                    username_fragment,
                };
                self.handler.on_ice_candidate(candidate).await;
            }
            IceAgentEvent::StateChange(ice_state) => {
                let state = RTCPeerConnectionState::from(ice_state);
                self.update_connection_state(state).await;

                // A failed transport is terminal: shut the connection down
                // and fail every later operation with ErrConnectionClosed.
                if state == RTCPeerConnectionState::Failed && !self.closed {
                    self.closed = true;
                    self.signaling_state = RTCSignalingState::Closed;
                    if let Err(err) = self.ice_agent.close() {
                        warn!("closing ice agent after failure: {err}");
                    }
                    self.transceivers.clear();
                    self.receive_routes.clear();
                }
            }
        }
    }

    async fn handle_rtp(&mut self, packet: rtp::packet::Packet) {
        if self.closed {
            return;
        }

        let ssrc = packet.header.ssrc;
        let released = match self.receive_routes.get_mut(&ssrc) {
            Some(route) => {
                let now = Instant::now();
                let output = route.jitter.insert(packet, now);
                route.deadline = output.timeout.map(|d| now + d);
                Some((route.track_id.clone(), output.packets))
            }
            None => {
                trace!("dropping RTP packet for unknown ssrc {ssrc}");
                None
            }
        };

        if let Some((track_id, packets)) = released {
            for packet in packets {
                self.handler.on_rtp(track_id.clone(), None, packet).await;
            }
        }
    }

    async fn handle_media_timeout(&mut self, now: Instant) {
        let mut released: Vec<(String, Vec<rtp::packet::Packet>)> = vec![];

        for route in self.receive_routes.values_mut() {
            let due = matches!(route.deadline, Some(deadline) if deadline <= now);
            if !due {
                continue;
            }
            let output = route.jitter.handle_timeout(now);
            route.deadline = output.timeout.map(|d| now + d);
            if !output.packets.is_empty() {
                released.push((route.track_id.clone(), output.packets));
            }
        }

        for (track_id, packets) in released {
            for packet in packets {
                self.handler.on_rtp(track_id.clone(), None, packet).await;
            }
        }
    }

    fn next_media_deadline(&self) -> Option<Instant> {
        self.receive_routes
            .values()
            .filter_map(|route| route.deadline)
            .min()
    }

    async fn update_signaling_state(&mut self, state: RTCSignalingState) {
        if self.signaling_state == state {
            return;
        }
        self.signaling_state = state;
        self.handler.on_signaling_state_change(state).await;
    }

    async fn update_connection_state(&mut self, state: RTCPeerConnectionState) {
        if self.connection_state == state {
            return;
        }
        self.connection_state = state;
        self.handler.on_connection_state_change(state).await;
    }
}
