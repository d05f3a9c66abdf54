// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the JSON command surface.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use printplug_lib::error::GatewayError;
use printplug_lib::{
    Action, ActuatorGateway, ApiHandler, DeviceMac, ErrorKind, PendingActionTracker, PrinterEvent,
    RegistrationStore, StaticDirectory,
};
use serde_json::{Value, json};

#[derive(Default)]
struct RecordingGateway {
    calls: Mutex<Vec<(DeviceMac, Action)>>,
}

impl ActuatorGateway for RecordingGateway {
    async fn actuate(&self, device: &DeviceMac, action: Action) -> Result<(), GatewayError> {
        self.calls.lock().push((device.clone(), action));
        Ok(())
    }
}

type Api = ApiHandler<StaticDirectory, Arc<RecordingGateway>>;

fn api() -> (Arc<RecordingGateway>, Api) {
    let directory = StaticDirectory::from_tagged([
        ("2C:AA:8E:00:00:01", "Enclosure light", "Light"),
        ("2C:AA:8E:00:00:02", "Printer plug", "Plug"),
        ("2C:AA:8E:00:00:03", "Front door", "Lock"),
    ])
    .unwrap();
    let gateway = Arc::new(RecordingGateway::default());
    let api = ApiHandler::new(
        Arc::new(RegistrationStore::new()),
        Arc::new(directory),
        PendingActionTracker::new(Arc::clone(&gateway)),
    );
    (gateway, api)
}

async fn send(api: &Api, command: Value) -> Value {
    api.handle_json(&command.to_string()).await.unwrap()
}

const LIGHT: &str = "2C:AA:8E:00:00:01";
const PLUG: &str = "2C:AA:8E:00:00:02";
const LOCK: &str = "2C:AA:8E:00:00:03";

#[tokio::test]
async fn get_enums_lists_vocabulary() {
    let (_gateway, api) = api();

    let reply = send(&api, json!({"command": "get_enums"})).await;

    assert_eq!(reply["actions"], json!(["TurnOn", "TurnOff"]));
    let events = reply["events"].as_array().unwrap();
    assert_eq!(events.len(), PrinterEvent::ALL.len());
    assert!(events.contains(&json!("PrintDone")));
}

#[tokio::test]
async fn get_devices_skips_unsupported_types() {
    let (_gateway, api) = api();

    let reply = send(&api, json!({"command": "get_devices"})).await;
    let devices = reply["devices"].as_array().unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0]["device_mac"], LIGHT);
    assert_eq!(devices[0]["device_type"], "Light");
    assert_eq!(devices[1]["device_name"], "Printer plug");
}

#[tokio::test]
async fn registration_lifecycle() {
    let (_gateway, api) = api();

    let reply = send(
        &api,
        json!({"command": "register", "device_mac": PLUG, "event_name": "PrintDone",
               "action_name": "TurnOff", "delay": 90.5}),
    )
    .await;
    assert_eq!(reply, json!({}));

    send(
        &api,
        json!({"command": "add_cancel", "device_mac": PLUG, "event_name": "PrintDone",
               "action_name": "TurnOff"}),
    )
    .await;

    let reply = send(&api, json!({"command": "get_devices"})).await;
    let plug = &reply["devices"][1];
    assert_eq!(
        plug["registrations"],
        json!([{"event_name": "PrintDone", "action_name": "TurnOff",
                "delay": 90.5, "cancel_on_conflict": true}])
    );
    let done = PrinterEvent::PrintDone.index();
    assert_eq!(plug["turn_off_registrations"][done], true);
    assert_eq!(plug["turn_on_registrations"][done], false);

    for _ in 0..2 {
        let reply = send(
            &api,
            json!({"command": "unregister", "device_mac": PLUG, "event_name": "PrintDone",
                   "action_name": "TurnOff"}),
        )
        .await;
        assert_eq!(reply, json!({}));
    }
    assert!(api.store().is_empty());
}

#[tokio::test]
async fn remove_cancel_on_missing_registration_is_not_found() {
    let (_gateway, api) = api();

    let err = api
        .handle_json(
            &json!({"command": "remove_cancel", "device_mac": PLUG, "event_name": "PrintDone",
                    "action_name": "TurnOff"})
            .to_string(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn negative_delay_is_invalid_configuration() {
    let (_gateway, api) = api();

    let err = api
        .handle_json(
            &json!({"command": "register", "device_mac": PLUG, "event_name": "PrintDone",
                    "action_name": "TurnOff", "delay": -3})
            .to_string(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    assert!(api.store().is_empty());
}

#[tokio::test]
async fn manual_switching_is_immediate() {
    let (gateway, api) = api();

    send(&api, json!({"command": "turn_on", "device_mac": LIGHT})).await;
    send(&api, json!({"command": "turn_off", "device_mac": PLUG})).await;

    assert_eq!(
        *gateway.calls.lock(),
        vec![
            (DeviceMac::new(LIGHT).unwrap(), Action::TurnOn),
            (DeviceMac::new(PLUG).unwrap(), Action::TurnOff),
        ]
    );

    let err = api
        .handle_json(&json!({"command": "turn_on", "device_mac": LOCK}).to_string())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test(start_paused = true)]
async fn event_to_pending_to_fired() {
    let (gateway, api) = api();

    send(
        &api,
        json!({"command": "register", "device_mac": LIGHT, "event_name": "PrintStarted",
               "action_name": "TurnOn"}),
    )
    .await;
    send(
        &api,
        json!({"command": "register", "device_mac": LIGHT, "event_name": "PrintDone",
               "action_name": "TurnOff", "delay": 30}),
    )
    .await;

    let reply = send(&api, json!({"command": "on_event", "event_name": "PrintDone"})).await;
    let ids = reply["pending_ids"].as_array().unwrap().clone();
    assert_eq!(ids.len(), 1);

    let reply = send(&api, json!({"command": "get_pending_actions"})).await;
    let pending = &reply["pending_actions"][0];
    assert_eq!(pending["pending_id"], ids[0]);
    assert_eq!(pending["device_mac"], LIGHT);
    assert_eq!(pending["action_name"], "TurnOff");
    assert_eq!(pending["delay"], 30.0);
    assert_eq!(pending["cancelled"], false);
    assert!(pending["fires_at"].as_str().unwrap() > pending["scheduled_at"].as_str().unwrap());

    let reply = send(&api, json!({"command": "on_event", "event_name": "Startup"})).await;
    assert_eq!(reply, json!({"pending_ids": []}));

    tokio::time::sleep(Duration::from_secs(31)).await;

    let reply = send(&api, json!({"command": "get_pending_actions"})).await;
    assert_eq!(reply, json!({"pending_actions": []}));
    assert_eq!(
        *gateway.calls.lock(),
        vec![(DeviceMac::new(LIGHT).unwrap(), Action::TurnOff)]
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_pending_command() {
    let (gateway, api) = api();

    send(
        &api,
        json!({"command": "register", "device_mac": PLUG, "event_name": "PrintPaused",
               "action_name": "TurnOff", "delay": 2}),
    )
    .await;
    let reply = send(
        &api,
        json!({"command": "on_event", "event_name": "PrintPaused", "device_mac": PLUG}),
    )
    .await;
    let id = reply["pending_ids"][0].clone();

    let reply = send(&api, json!({"command": "cancel_pending", "pending_id": id})).await;
    assert_eq!(reply, json!({"cancelled": true}));
    let reply = send(&api, json!({"command": "cancel_pending", "pending_id": id})).await;
    assert_eq!(reply, json!({"cancelled": false}));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(gateway.calls.lock().is_empty());

    let err = api
        .handle_json(&json!({"command": "cancel_pending", "pending_id": "nope"}).to_string())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
}

#[tokio::test(start_paused = true)]
async fn registration_for_undiscovered_device_schedules_nothing() {
    let (gateway, api) = api();

    send(
        &api,
        json!({"command": "register", "device_mac": LOCK, "event_name": "PrintFailed",
               "action_name": "TurnOn"}),
    )
    .await;

    let reply = send(&api, json!({"command": "on_event", "event_name": "PrintFailed"})).await;
    assert_eq!(reply, json!({"pending_ids": []}));
    let reply = send(
        &api,
        json!({"command": "on_event", "event_name": "PrintFailed", "device_mac": LOCK}),
    )
    .await;
    assert_eq!(reply, json!({"pending_ids": []}));

    let reply = send(&api, json!({"command": "get_pending_actions"})).await;
    assert_eq!(reply, json!({"pending_actions": []}));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(gateway.calls.lock().is_empty());
}
