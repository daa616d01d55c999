//! Wire codec for button actions.
//!
//! Navigation tokens travel as `n:<view>:<entity>[:<parent>]` and flow
//! actions as `a:<tag>[:<arg>]`. Both are capped at [`MAX_TOKEN_LEN`] bytes
//! and must round-trip exactly: a string that decodes but re-encodes
//! differently (leading zeros, `+5`) is rejected.

use showroom_types::error::NavError;
use showroom_types::navigation::{ActionToken, FlowAction, Location, NavToken, View};

/// Upper bound on an encoded token, in bytes.
pub const MAX_TOKEN_LEN: usize = 64;

/// Encoded `Location::Categories`, the browse root.
pub const ROOT_TOKEN: &str = "n:c:0";

const NAV_PREFIX: &str = "n";
const FLOW_PREFIX: &str = "a";

fn invalid(reason: impl Into<String>) -> NavError {
    NavError::InvalidToken(reason.into())
}

/// Encode a navigation token.
///
/// Refuses tokens that describe no legal view or would exceed the length cap.
pub fn encode(token: &NavToken) -> Result<String, NavError> {
    Location::try_from(*token)?;
    let encoded = match token.parent_id {
        Some(parent) => format!(
            "{NAV_PREFIX}:{}:{}:{parent}",
            token.view.tag(),
            token.entity_id
        ),
        None => format!("{NAV_PREFIX}:{}:{}", token.view.tag(), token.entity_id),
    };
    if encoded.len() > MAX_TOKEN_LEN {
        return Err(invalid(format!("token exceeds {MAX_TOKEN_LEN} bytes")));
    }
    Ok(encoded)
}

/// Encode a typed browse location.
pub fn encode_location(location: Location) -> Result<String, NavError> {
    encode(&location.to_token())
}

/// Decode a navigation token.
///
/// The result always maps onto a legal `Location`; whether the entities it
/// names still exist is checked when the token is used.
pub fn decode(raw: &str) -> Result<NavToken, NavError> {
    check_len(raw)?;
    let mut parts = raw.split(':');
    if parts.next() != Some(NAV_PREFIX) {
        return Err(invalid("missing navigation prefix"));
    }
    let view = parts
        .next()
        .and_then(View::from_tag)
        .ok_or_else(|| invalid("unknown view tag"))?;
    let entity_id = parse_id(parts.next().ok_or_else(|| invalid("missing entity id"))?)?;
    let parent_id = parts.next().map(parse_id).transpose()?;
    if parts.next().is_some() {
        return Err(invalid("too many segments"));
    }

    let token = NavToken::new(view, entity_id, parent_id);
    if encode(&token)? != raw {
        return Err(invalid("non-canonical encoding"));
    }
    Ok(token)
}

/// Decode a navigation token straight into a typed location.
pub fn decode_location(raw: &str) -> Result<Location, NavError> {
    Location::try_from(decode(raw)?)
}

/// Encode a flow action.
pub fn encode_action(action: FlowAction) -> String {
    let (tag, arg) = flow_parts(action);
    match arg {
        Some(arg) => format!("{FLOW_PREFIX}:{tag}:{arg}"),
        None => format!("{FLOW_PREFIX}:{tag}"),
    }
}

/// Decode any button payload: a navigation token or a flow action.
pub fn decode_action(raw: &str) -> Result<ActionToken, NavError> {
    check_len(raw)?;
    match raw.split_once(':').map(|(prefix, _)| prefix) {
        Some(NAV_PREFIX) => decode(raw).map(ActionToken::Nav),
        Some(FLOW_PREFIX) => decode_flow(raw).map(ActionToken::Flow),
        _ => Err(invalid("unknown action prefix")),
    }
}

fn decode_flow(raw: &str) -> Result<FlowAction, NavError> {
    let mut parts = raw.split(':').skip(1);
    let tag = parts.next().ok_or_else(|| invalid("missing action tag"))?;
    let arg = parts.next().map(parse_id).transpose()?;
    if parts.next().is_some() {
        return Err(invalid("too many segments"));
    }

    let action = match (tag, arg) {
        ("adm", None) => FlowAction::AdminMenu,
        ("add", None) => FlowAction::StartAdd,
        ("edt", None) => FlowAction::StartEdit,
        ("x", None) => FlowAction::Cancel,
        ("cat", Some(id)) => FlowAction::PickCategory(id),
        ("sub", Some(id)) => FlowAction::PickSubcategory(id),
        ("nosub", None) => FlowAction::SkipSubcategory,
        ("imgok", None) => FlowAction::ImagesDone,
        ("save", None) => FlowAction::ConfirmSave,
        ("prd", Some(id)) => FlowAction::PickProduct(id),
        ("find", None) => FlowAction::NewSearch,
        ("all", None) => FlowAction::ShowAll,
        ("e-name", None) => FlowAction::EditName,
        ("e-short", None) => FlowAction::EditShortDescription,
        ("e-info", None) => FlowAction::EditAdditionalInfo,
        ("e-cat", None) => FlowAction::EditCategory,
        ("e-img", None) => FlowAction::EditImages,
        ("view", None) => FlowAction::ViewProduct,
        ("done", None) => FlowAction::FinishEdit,
        ("menu", None) => FlowAction::BackToMenu,
        ("i-add", None) => FlowAction::AddImage,
        ("i-list", Some(page)) => {
            FlowAction::ListImages(u32::try_from(page).map_err(|_| invalid("page out of range"))?)
        }
        ("i-del", None) => FlowAction::DeleteImageMenu,
        ("i-rm", Some(id)) => FlowAction::DeleteImage(id),
        ("i-back", None) => FlowAction::BackToImages,
        (tag, _) => return Err(invalid(format!("unknown action '{tag}'"))),
    };

    if encode_action(action) != raw {
        return Err(invalid("non-canonical encoding"));
    }
    Ok(action)
}

fn flow_parts(action: FlowAction) -> (&'static str, Option<i64>) {
    match action {
        FlowAction::AdminMenu => ("adm", None),
        FlowAction::StartAdd => ("add", None),
        FlowAction::StartEdit => ("edt", None),
        FlowAction::Cancel => ("x", None),
        FlowAction::PickCategory(id) => ("cat", Some(id)),
        FlowAction::PickSubcategory(id) => ("sub", Some(id)),
        FlowAction::SkipSubcategory => ("nosub", None),
        FlowAction::ImagesDone => ("imgok", None),
        FlowAction::ConfirmSave => ("save", None),
        FlowAction::PickProduct(id) => ("prd", Some(id)),
        FlowAction::NewSearch => ("find", None),
        FlowAction::ShowAll => ("all", None),
        FlowAction::EditName => ("e-name", None),
        FlowAction::EditShortDescription => ("e-short", None),
        FlowAction::EditAdditionalInfo => ("e-info", None),
        FlowAction::EditCategory => ("e-cat", None),
        FlowAction::EditImages => ("e-img", None),
        FlowAction::ViewProduct => ("view", None),
        FlowAction::FinishEdit => ("done", None),
        FlowAction::BackToMenu => ("menu", None),
        FlowAction::AddImage => ("i-add", None),
        FlowAction::ListImages(page) => ("i-list", Some(i64::from(page))),
        FlowAction::DeleteImageMenu => ("i-del", None),
        FlowAction::DeleteImage(id) => ("i-rm", Some(id)),
        FlowAction::BackToImages => ("i-back", None),
    }
}

fn check_len(raw: &str) -> Result<(), NavError> {
    if raw.len() > MAX_TOKEN_LEN {
        Err(invalid(format!("token exceeds {MAX_TOKEN_LEN} bytes")))
    } else {
        Ok(())
    }
}

/// Ids are plain decimal digits. Signs are rejected here so that a
/// negative id never reaches a lookup.
fn parse_id(segment: &str) -> Result<i64, NavError> {
    if segment.starts_with('-') {
        return Err(invalid("negative id"));
    }
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(format!("non-numeric id '{segment}'")));
    }
    segment
        .parse::<i64>()
        .map_err(|_| invalid(format!("id out of range '{segment}'")))
}
