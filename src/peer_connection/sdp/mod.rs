//! SDP synthesis and inspection.
//!
//! Media sections are rendered from transceivers through the external `sdp`
//! crate's builder API; remote descriptions are consumed through the same
//! crate's parsed form.

pub mod sdp_type;
pub mod session_description;


use sdp::description::media::MediaDescription;
use sdp::description::session::{
    SessionDescription, ATTR_KEY_CONNECTION_SETUP, ATTR_KEY_EXT_MAP, ATTR_KEY_GROUP, ATTR_KEY_MID,
    ATTR_KEY_MSID, ATTR_KEY_MSID_SEMANTIC, ATTR_KEY_RTCPMUX, ATTR_KEY_SSRC, ATTR_KEY_SSRCGROUP,
};
use sdp::util::ConnectionRole;

use crate::error::{Error, Result};
use crate::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use crate::rtp_transceiver::{RTCRtpTransceiver, SSRC};

const ATTR_KEY_ICE_UFRAG: &str = "ice-ufrag";
const ATTR_KEY_ICE_PWD: &str = "ice-pwd";
const ATTR_KEY_ICE_OPTIONS: &str = "ice-options";
const ATTR_KEY_FINGERPRINT: &str = "fingerprint";
const ATTR_KEY_RTCP_FB: &str = "rtcp-fb";

/// The mid used when a media section is rendered for a transceiver that has
/// not been assigned one yet.
const DEFAULT_CANDIDATE_MID: &str = "0";

/// Session-level parameters shared by every media section of a description:
/// ICE credentials, the DTLS fingerprint and connection role, and the
/// negotiated header extensions.
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub ice_ufrag: String,
    pub ice_pwd: String,
    pub ice_options: String,
    pub fingerprint_algorithm: String,
    pub fingerprint_value: String,
    pub setup: ConnectionRole,
    pub header_extensions: Vec<String>,
}

/// Renders one offer media section for a transceiver.
///
/// Sender attributes (msid, ssrc, ssrc-group) appear iff the direction
/// includes sending and at least one primary codec is negotiated; the FID
/// ssrc-group appears iff an RTX SSRC was allocated.
pub fn offer_media_description(
    t: &RTCRtpTransceiver,
    session: &SessionParams,
) -> MediaDescription {
    media_description_with(
        t,
        t.mid().unwrap_or(DEFAULT_CANDIDATE_MID),
        t.direction(),
        session,
    )
}

/// Renders a media section with an explicit mid and direction; the answer
/// path uses this with the remote's mid and the reconciled direction.
pub(crate) fn media_description_with(
    t: &RTCRtpTransceiver,
    mid: &str,
    direction: RTCRtpTransceiverDirection,
    session: &SessionParams,
) -> MediaDescription {
    let mut media =
        MediaDescription::new_jsep_media_description(t.kind().to_string(), vec![])
            .with_ice_credentials(session.ice_ufrag.clone(), session.ice_pwd.clone());

    if !session.ice_options.is_empty() {
        media = media.with_value_attribute(
            ATTR_KEY_ICE_OPTIONS.to_owned(),
            session.ice_options.clone(),
        );
    }

    media = media
        .with_fingerprint(
            session.fingerprint_algorithm.clone(),
            session.fingerprint_value.clone(),
        )
        .with_value_attribute(
            ATTR_KEY_CONNECTION_SETUP.to_owned(),
            session.setup.to_string(),
        )
        .with_value_attribute(ATTR_KEY_MID.to_owned(), mid.to_owned())
        .with_property_attribute(ATTR_KEY_RTCPMUX.to_owned());

    for (i, uri) in session.header_extensions.iter().enumerate() {
        media = media.with_value_attribute(ATTR_KEY_EXT_MAP.to_owned(), format!("{} {uri}", i + 1));
    }

    // Stopped is not a wire direction; a stopped transceiver offers inactive.
    let direction_attribute = match direction {
        RTCRtpTransceiverDirection::Stopped => RTCRtpTransceiverDirection::Inactive,
        d => d,
    };
    media = media.with_property_attribute(direction_attribute.to_string());

    for codec in t.codecs() {
        media = media.with_codec(
            codec.payload_type,
            codec.name().to_owned(),
            codec.capability.clock_rate,
            codec.capability.channels,
            codec.capability.sdp_fmtp_line.clone(),
        );
        for fb in &codec.capability.rtcp_feedback {
            let value = if fb.parameter.is_empty() {
                format!("{} {}", codec.payload_type, fb.typ)
            } else {
                format!("{} {} {}", codec.payload_type, fb.typ, fb.parameter)
            };
            media = media.with_value_attribute(ATTR_KEY_RTCP_FB.to_owned(), value);
        }
    }

    let has_primary_codec = t.codecs().iter().any(|c| !c.is_rtx());
    if direction.has_send() && has_primary_codec {
        let stream_ids: Vec<String> = match t.sender().track() {
            Some(track) if !track.stream_ids().is_empty() => track.stream_ids().to_vec(),
            _ => vec!["-".to_owned()],
        };

        for id in &stream_ids {
            media = media.with_value_attribute(ATTR_KEY_MSID.to_owned(), id.clone());
        }

        let ssrc = t.sender().ssrc();
        let rtx_ssrc = t.sender().rtx_ssrc();

        if let Some(rtx) = rtx_ssrc {
            media = media
                .with_value_attribute(ATTR_KEY_SSRCGROUP.to_owned(), format!("FID {ssrc} {rtx}"));
        }

        let mut ssrcs = vec![ssrc];
        ssrcs.extend(rtx_ssrc);
        for s in ssrcs {
            for id in &stream_ids {
                media = media.with_value_attribute(ATTR_KEY_SSRC.to_owned(), format!("{s} msid:{id}"));
            }
        }
    }

    media
}

/// Assembles the session-level description around rendered media sections.
pub(crate) fn populate_session_description(
    session_id: u64,
    session_version: u64,
    mids: &[String],
    media: Vec<MediaDescription>,
) -> SessionDescription {
    let mut d = SessionDescription::new_jsep_session_description(false);
    d.origin.session_id = session_id;
    d.origin.session_version = session_version;
    d.origin.unicast_address = "127.0.0.1".to_owned();

    let bundle = format!("BUNDLE {}", mids.join(" "));
    let mut d = d
        .with_value_attribute(ATTR_KEY_GROUP.to_owned(), bundle.trim_end().to_owned())
        .with_value_attribute(ATTR_KEY_MSID_SEMANTIC.to_owned(), "WMS".to_owned());

    for m in media {
        d = d.with_media(m);
    }

    d
}

/// Pulls the remote ICE credentials out of a parsed description. Credentials
/// may sit at the session level or on every media section; conflicting
/// values are rejected.
pub(crate) fn extract_ice_details(parsed: &SessionDescription) -> Result<(String, String)> {
    let mut ufrag = parsed.attribute(ATTR_KEY_ICE_UFRAG).cloned();
    let mut pwd = parsed.attribute(ATTR_KEY_ICE_PWD).cloned();

    for media in &parsed.media_descriptions {
        if let Some(Some(value)) = media.attribute(ATTR_KEY_ICE_UFRAG) {
            match &ufrag {
                Some(existing) if existing.as_str() != value => {
                    return Err(Error::ErrSessionDescriptionConflictingIceUfrag)
                }
                _ => ufrag = Some(value.to_owned()),
            }
        }
        if let Some(Some(value)) = media.attribute(ATTR_KEY_ICE_PWD) {
            match &pwd {
                Some(existing) if existing.as_str() != value => {
                    return Err(Error::ErrSessionDescriptionConflictingIcePwd)
                }
                _ => pwd = Some(value.to_owned()),
            }
        }
    }

    let ufrag = ufrag.ok_or(Error::ErrSessionDescriptionMissingIceUfrag)?;
    let pwd = pwd.ok_or(Error::ErrSessionDescriptionMissingIcePwd)?;
    Ok((ufrag, pwd))
}

/// Pulls the DTLS fingerprint out of a parsed description, as its
/// `(hash function, value)` pair.
pub(crate) fn extract_fingerprint(parsed: &SessionDescription) -> Result<(String, String)> {
    let mut fingerprint = parsed.attribute(ATTR_KEY_FINGERPRINT).cloned();

    for media in &parsed.media_descriptions {
        if let Some(Some(value)) = media.attribute(ATTR_KEY_FINGERPRINT) {
            match &fingerprint {
                Some(existing) if existing.as_str() != value => {
                    return Err(Error::ErrSessionDescriptionConflictingFingerprints)
                }
                _ => fingerprint = Some(value.to_owned()),
            }
        }
    }

    let fingerprint = fingerprint.ok_or(Error::ErrSessionDescriptionNoFingerprint)?;
    match fingerprint.split_once(' ') {
        Some((algorithm, value)) if !algorithm.is_empty() && !value.is_empty() => {
            Ok((algorithm.to_owned(), value.to_owned()))
        }
        _ => Err(Error::ErrSessionDescriptionInvalidFingerprint),
    }
}

/// The mid of a media section, if present.
pub(crate) fn media_mid(media: &MediaDescription) -> Option<&str> {
    media.attribute(ATTR_KEY_MID).flatten()
}

/// The declared direction of a media section. A section without a direction
/// attribute is sendrecv per RFC 4566.
pub(crate) fn media_direction(media: &MediaDescription) -> RTCRtpTransceiverDirection {
    for direction in [
        RTCRtpTransceiverDirection::Sendrecv,
        RTCRtpTransceiverDirection::Sendonly,
        RTCRtpTransceiverDirection::Recvonly,
        RTCRtpTransceiverDirection::Inactive,
    ] {
        if media.attribute(&direction.to_string()).is_some() {
            return direction;
        }
    }
    RTCRtpTransceiverDirection::Sendrecv
}

/// The stream ids announced by a media section's msid attributes, in order.
/// The placeholder "-" id is not a stream.
pub(crate) fn media_stream_ids(media: &MediaDescription) -> Vec<String> {
    media
        .attributes
        .iter()
        .filter(|a| a.key == ATTR_KEY_MSID)
        .filter_map(|a| a.value.as_deref())
        .map(|v| v.split_whitespace().next().unwrap_or(v).to_owned())
        .filter(|v| v != "-")
        .collect()
}

/// The SSRCs announced by a media section, unique and in order of first
/// appearance. The first entry is the primary stream.
pub(crate) fn media_ssrcs(media: &MediaDescription) -> Vec<SSRC> {
    let mut ssrcs = Vec::new();
    for a in &media.attributes {
        if a.key != ATTR_KEY_SSRC {
            continue;
        }
        let Some(value) = a.value.as_deref() else {
            continue;
        };
        let Some(first) = value.split_whitespace().next() else {
            continue;
        };
        if let Ok(ssrc) = first.parse::<SSRC>() {
            if !ssrcs.contains(&ssrc) {
                ssrcs.push(ssrc);
            }
        }
    }
    ssrcs
}
