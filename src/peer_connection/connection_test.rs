use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::error::{Error, Result};
use crate::ice_transport::ice_candidate::RTCIceCandidateInit;
use crate::ice_transport::ice_connection_state::RTCIceConnectionState;
use crate::ice_transport::ice_role::RTCIceRole;
use crate::ice_transport::{IceAgent, IceAgentEvent, IceCredentials};
use crate::media_stream::MediaStreamTrack;
use crate::peer_connection::configuration::RTCConfigurationBuilder;
use crate::peer_connection::peer_connection_state::RTCPeerConnectionState;
use crate::peer_connection::sdp::sdp_type::RTCSdpType;
use crate::peer_connection::sdp::session_description::RTCSessionDescription;
use crate::peer_connection::signaling_state::RTCSignalingState;
use crate::peer_connection::{PeerConnection, PeerConnectionBuilder, PeerConnectionEventHandler};
use crate::rtp_transceiver::rtp_codec::RTPCodecType;
use crate::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

struct MockIceAgent {
    ufrag: String,
    pwd: String,
    started: Mutex<Option<RTCIceRole>>,
    remote_credentials: Mutex<Option<(String, String)>>,
    remote_candidates: Mutex<Vec<String>>,
    closed: Mutex<bool>,
}

impl MockIceAgent {
    fn new(ufrag: &str) -> Arc<Self> {
        Arc::new(MockIceAgent {
            ufrag: ufrag.to_owned(),
            pwd: format!("{ufrag}-pwd"),
            started: Mutex::new(None),
            remote_credentials: Mutex::new(None),
            remote_candidates: Mutex::new(vec![]),
            closed: Mutex::new(false),
        })
    }
}

impl IceAgent for MockIceAgent {
    fn start(&self, role: RTCIceRole, _stun_servers: Vec<String>) -> Result<()> {
        *self.started.lock().unwrap() = Some(role);
        Ok(())
    }

    fn local_credentials(&self) -> Result<IceCredentials> {
        Ok(IceCredentials {
            ufrag: self.ufrag.clone(),
            pwd: self.pwd.clone(),
        })
    }

    fn set_remote_credentials(&self, ufrag: String, pwd: String) -> Result<()> {
        *self.remote_credentials.lock().unwrap() = Some((ufrag, pwd));
        Ok(())
    }

    fn gather_candidates(&self) -> Result<()> {
        Ok(())
    }

    fn add_remote_candidate(&self, attr: String) -> Result<()> {
        self.remote_candidates.lock().unwrap().push(attr);
        Ok(())
    }

    fn restart(&self) -> Result<()> {
        Ok(())
    }

    fn close(&self) -> Result<()> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

#[derive(Debug)]
enum Event {
    Candidate(RTCIceCandidateInit),
    Signaling(RTCSignalingState),
    Connection(RTCPeerConnectionState),
    Track(MediaStreamTrack),
    Rtp(String, u16),
}

struct RecordingHandler {
    events: mpsc::UnboundedSender<Event>,
}

#[async_trait::async_trait]
impl PeerConnectionEventHandler for RecordingHandler {
    async fn on_ice_candidate(&self, candidate: RTCIceCandidateInit) {
        let _ = self.events.send(Event::Candidate(candidate));
    }

    async fn on_signaling_state_change(&self, state: RTCSignalingState) {
        let _ = self.events.send(Event::Signaling(state));
    }

    async fn on_connection_state_change(&self, state: RTCPeerConnectionState) {
        let _ = self.events.send(Event::Connection(state));
    }

    async fn on_track(&self, track: MediaStreamTrack) {
        let _ = self.events.send(Event::Track(track));
    }

    async fn on_rtp(&self, track_id: String, _rid: Option<String>, packet: rtp::packet::Packet) {
        let _ = self
            .events
            .send(Event::Rtp(track_id, packet.header.sequence_number));
    }
}

struct TestPeer {
    pc: PeerConnection,
    agent: Arc<MockIceAgent>,
    events: mpsc::UnboundedReceiver<Event>,
    ice_events: mpsc::UnboundedSender<IceAgentEvent>,
}

fn new_peer(ufrag: &str) -> Result<TestPeer> {
    let config = RTCConfigurationBuilder::new().build()?;
    let agent = MockIceAgent::new(ufrag);
    let (ice_tx, ice_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let pc = PeerConnectionBuilder::new(config)
        .with_event_handler(Arc::new(RecordingHandler { events: event_tx }))
        .with_ice_agent(agent.clone(), ice_rx)
        .start()?;

    Ok(TestPeer {
        pc,
        agent,
        events: event_rx,
        ice_events: ice_tx,
    })
}

async fn next_event(peer: &mut TestPeer) -> Event {
    timeout(EVENT_TIMEOUT, peer.events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

fn media_packet(ssrc: u32, seq: u16) -> rtp::packet::Packet {
    rtp::packet::Packet {
        header: rtp::header::Header {
            sequence_number: seq,
            ssrc,
            ..Default::default()
        },
        payload: Bytes::from_static(&[0xde, 0xad]),
    }
}

#[tokio::test]
async fn test_start_launches_ice_agent_in_controlled_role() -> Result<()> {
    let peer = new_peer("ufragA")?;
    assert_eq!(
        *peer.agent.started.lock().unwrap(),
        Some(RTCIceRole::Controlled)
    );
    assert_eq!(
        peer.pc.signaling_state().await?,
        RTCSignalingState::Stable
    );
    assert_eq!(
        peer.pc.connection_state().await?,
        RTCPeerConnectionState::New
    );
    Ok(())
}

#[tokio::test]
async fn test_offer_answer_dance() -> Result<()> {
    let mut offerer = new_peer("ufragA")?;
    let mut answerer = new_peer("ufragB")?;

    let track = MediaStreamTrack::new(RTPCodecType::Video, vec!["chat".to_owned()]);
    let transceiver = offerer.pc.add_track(track).await?;
    assert_eq!(
        transceiver.direction(),
        RTCRtpTransceiverDirection::Sendrecv
    );

    let offer = offerer.pc.create_offer(None).await?;
    assert_eq!(offer.sdp_type, RTCSdpType::Offer);
    assert!(offer.sdp.contains("m=video"));
    assert!(offer.sdp.contains("a=setup:actpass"));
    assert!(offer.sdp.contains("a=msid:chat"));

    offerer.pc.set_local_description(offer.clone()).await?;
    assert_eq!(
        offerer.pc.signaling_state().await?,
        RTCSignalingState::HaveLocalOffer
    );
    assert!(matches!(
        next_event(&mut offerer).await,
        Event::Signaling(RTCSignalingState::HaveLocalOffer)
    ));

    answerer.pc.set_remote_description(offer).await?;
    assert_eq!(
        answerer.pc.signaling_state().await?,
        RTCSignalingState::HaveRemoteOffer
    );

    // The remote m-line sends, so the answerer sees a new inbound track
    // before the signaling state event.
    let track_event = next_event(&mut answerer).await;
    let remote_track = match track_event {
        Event::Track(track) => track,
        other => panic!("expected track event, got {other:?}"),
    };
    assert_eq!(remote_track.kind(), RTPCodecType::Video);
    assert_eq!(remote_track.stream_ids().to_vec(), vec!["chat".to_owned()]);
    assert!(matches!(
        next_event(&mut answerer).await,
        Event::Signaling(RTCSignalingState::HaveRemoteOffer)
    ));

    // The offerer's credentials reached the answerer's agent.
    assert_eq!(
        *answerer.agent.remote_credentials.lock().unwrap(),
        Some(("ufragA".to_owned(), "ufragA-pwd".to_owned()))
    );

    let answer = answerer.pc.create_answer(None).await?;
    assert_eq!(answer.sdp_type, RTCSdpType::Answer);
    // The answerer has nothing to send on this transceiver.
    assert!(answer.sdp.contains("a=recvonly"));
    assert!(answer.sdp.contains("a=setup:active"));
    assert!(answer.sdp.contains("a=ice-ufrag:ufragB"));

    answerer.pc.set_local_description(answer.clone()).await?;
    assert_eq!(
        answerer.pc.signaling_state().await?,
        RTCSignalingState::Stable
    );

    offerer.pc.set_remote_description(answer).await?;
    assert_eq!(
        offerer.pc.signaling_state().await?,
        RTCSignalingState::Stable
    );

    // Negotiation settled: both sides hold current descriptions only.
    assert!(offerer.pc.local_description().await?.is_some());
    assert!(offerer.pc.remote_description().await?.is_some());
    assert_eq!(answerer.pc.transceivers().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_stop_transceiver_keeps_it_listed() -> Result<()> {
    let peer = new_peer("ufragA")?;

    let track = MediaStreamTrack::new(RTPCodecType::Audio, vec![]);
    peer.pc.add_track(track).await?;
    peer.pc.create_offer(None).await?;

    peer.pc.stop_transceiver("0".to_owned()).await?;

    let transceivers = peer.pc.transceivers().await?;
    assert_eq!(transceivers.len(), 1);
    assert_eq!(
        transceivers[0].direction(),
        RTCRtpTransceiverDirection::Stopped
    );

    // Stopped transceivers offer inactive on the next negotiation.
    let offer = peer.pc.create_offer(None).await?;
    assert!(offer.sdp.contains("a=inactive"));

    let result = peer.pc.stop_transceiver("7".to_owned()).await;
    assert!(matches!(result, Err(Error::ErrOthers(_))));

    Ok(())
}

#[tokio::test]
async fn test_create_answer_requires_remote_offer() -> Result<()> {
    let peer = new_peer("ufragA")?;
    let result = peer.pc.create_answer(None).await;
    assert!(matches!(result, Err(Error::ErrIncorrectSignalingState)));
    Ok(())
}

#[tokio::test]
async fn test_invalid_transition_reports_error_without_state_change() -> Result<()> {
    let peer = new_peer("ufragA")?;

    let offer = peer.pc.create_offer(None).await?;
    let answer = RTCSessionDescription {
        sdp_type: RTCSdpType::Answer,
        sdp: offer.sdp,
        parsed: None,
    };

    // stable->SetLocal(answer) is outside the table.
    let result = peer.pc.set_local_description(answer).await;
    assert!(matches!(
        result,
        Err(Error::ErrSignalingStateProposedTransitionInvalid { .. })
    ));
    assert_eq!(peer.pc.signaling_state().await?, RTCSignalingState::Stable);

    Ok(())
}

#[tokio::test]
async fn test_malformed_remote_sdp_rejected() -> Result<()> {
    let peer = new_peer("ufragA")?;

    let desc = RTCSessionDescription {
        sdp_type: RTCSdpType::Offer,
        sdp: "definitely not sdp".to_owned(),
        parsed: None,
    };
    let result = peer.pc.set_remote_description(desc).await;
    assert!(matches!(result, Err(Error::ErrSdpError(_))));
    assert_eq!(peer.pc.signaling_state().await?, RTCSignalingState::Stable);

    Ok(())
}

#[tokio::test]
async fn test_rollback_restores_stable() -> Result<()> {
    let mut peer = new_peer("ufragA")?;

    let offer = peer.pc.create_offer(None).await?;
    peer.pc.set_local_description(offer).await?;
    assert!(matches!(
        next_event(&mut peer).await,
        Event::Signaling(RTCSignalingState::HaveLocalOffer)
    ));

    peer.pc
        .set_local_description(RTCSessionDescription::rollback())
        .await?;
    assert_eq!(peer.pc.signaling_state().await?, RTCSignalingState::Stable);
    // The pending description is discarded, nothing was ever current.
    assert!(peer.pc.local_description().await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_add_ice_candidate_strips_prefix() -> Result<()> {
    let peer = new_peer("ufragA")?;

    peer.pc
        .add_ice_candidate(RTCIceCandidateInit {
            candidate: "candidate:1 1 UDP 2130706431 192.0.2.1 54321 typ host".to_owned(),
            ..Default::default()
        })
        .await?;

    assert_eq!(
        *peer.agent.remote_candidates.lock().unwrap(),
        vec!["1 1 UDP 2130706431 192.0.2.1 54321 typ host".to_owned()]
    );
    Ok(())
}

#[tokio::test]
async fn test_ice_candidate_event_reaches_owner() -> Result<()> {
    let mut peer = new_peer("ufragA")?;

    peer.ice_events
        .send(IceAgentEvent::NewCandidate(
            "1 1 UDP 2130706431 192.0.2.1 54321 typ host".to_owned(),
        ))
        .expect("actor alive");

    let event = next_event(&mut peer).await;
    let candidate = match event {
        Event::Candidate(candidate) => candidate,
        other => panic!("expected candidate event, got {other:?}"),
    };
    assert_eq!(
        candidate.candidate,
        "candidate:1 1 UDP 2130706431 192.0.2.1 54321 typ host"
    );
    assert_eq!(candidate.sdp_mline_index, Some(0));
    assert_eq!(candidate.username_fragment, Some("ufragA".to_owned()));

    Ok(())
}

#[tokio::test]
async fn test_ice_failure_is_terminal() -> Result<()> {
    let mut peer = new_peer("ufragA")?;

    peer.ice_events
        .send(IceAgentEvent::StateChange(RTCIceConnectionState::Checking))
        .expect("actor alive");
    assert!(matches!(
        next_event(&mut peer).await,
        Event::Connection(RTCPeerConnectionState::Connecting)
    ));

    peer.ice_events
        .send(IceAgentEvent::StateChange(RTCIceConnectionState::Failed))
        .expect("actor alive");
    assert!(matches!(
        next_event(&mut peer).await,
        Event::Connection(RTCPeerConnectionState::Failed)
    ));

    let result = peer.pc.create_offer(None).await;
    assert!(matches!(result, Err(Error::ErrConnectionClosed)));
    assert!(*peer.agent.closed.lock().unwrap());

    Ok(())
}

#[tokio::test]
async fn test_close_fails_later_operations() -> Result<()> {
    let mut peer = new_peer("ufragA")?;

    peer.pc.close().await?;
    assert!(matches!(
        next_event(&mut peer).await,
        Event::Connection(RTCPeerConnectionState::Closed)
    ));
    assert!(*peer.agent.closed.lock().unwrap());

    let result = peer.pc.create_offer(None).await;
    assert!(matches!(result, Err(Error::ErrConnectionClosed)));

    Ok(())
}

#[tokio::test]
async fn test_rtp_released_in_order_through_jitter_buffer() -> Result<()> {
    let mut offerer = new_peer("ufragA")?;
    let mut answerer = new_peer("ufragB")?;

    let track = MediaStreamTrack::new(RTPCodecType::Video, vec!["chat".to_owned()]);
    offerer.pc.add_track(track).await?;

    let offer = offerer.pc.create_offer(None).await?;
    let ssrc = offerer.pc.transceivers().await?[0].sender().ssrc();

    answerer.pc.set_remote_description(offer).await?;
    let remote_track = match next_event(&mut answerer).await {
        Event::Track(track) => track,
        other => panic!("expected track event, got {other:?}"),
    };

    // 7 establishes the base and is released at once; 9 waits on 8.
    answerer.pc.receive_rtp(media_packet(ssrc, 7)).await?;
    answerer.pc.receive_rtp(media_packet(ssrc, 9)).await?;
    answerer.pc.receive_rtp(media_packet(ssrc, 8)).await?;

    let mut released = vec![];
    while released.len() < 3 {
        match next_event(&mut answerer).await {
            Event::Rtp(track_id, seq) => {
                assert_eq!(track_id, remote_track.id());
                released.push(seq);
            }
            Event::Signaling(_) => {}
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(released, vec![7, 8, 9]);

    // Unroutable SSRCs are dropped silently.
    answerer
        .pc
        .receive_rtp(media_packet(ssrc.wrapping_add(1), 10))
        .await?;

    Ok(())
}

#[tokio::test]
async fn test_gap_is_released_by_media_timer() -> Result<()> {
    let mut offerer = new_peer("ufragA")?;
    let mut answerer = new_peer("ufragB")?;

    let track = MediaStreamTrack::new(RTPCodecType::Video, vec!["chat".to_owned()]);
    offerer.pc.add_track(track).await?;

    let offer = offerer.pc.create_offer(None).await?;
    let ssrc = offerer.pc.transceivers().await?[0].sender().ssrc();
    answerer.pc.set_remote_description(offer).await?;

    answerer.pc.receive_rtp(media_packet(ssrc, 1)).await?;
    // 3 is held back by the missing 2 until the latency deadline passes.
    answerer.pc.receive_rtp(media_packet(ssrc, 3)).await?;

    let mut released = vec![];
    while released.len() < 2 {
        match next_event(&mut answerer).await {
            Event::Rtp(_, seq) => released.push(seq),
            Event::Track(_) | Event::Signaling(_) => {}
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(released, vec![1, 3]);

    Ok(())
}
