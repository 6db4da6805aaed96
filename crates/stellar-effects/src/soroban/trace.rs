//! Invocation trace reconstruction.
//!
//! With diagnostics enabled the host brackets every contract call with
//! `fn_call` / `fn_return` diagnostic events, and the trace is a stack walk
//! over them. Without diagnostics the trace is approximated from the host
//! function and its authorization tree, with all events on the root call.

use stellar_xdr::curr::{
    ContractEvent, ContractEventBody, ContractEventType, ContractId, DiagnosticEvent, Hash,
    HostFunction, ScAddress, ScError, ScVal, SorobanAuthorizationEntry,
    SorobanAuthorizedFunction, SorobanAuthorizedInvocation,
};

/// One step of the depth-first, call-ordered trace.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceItem {
    Invoke {
        contract: ScAddress,
        function: String,
        args: Vec<ScVal>,
        depth: u32,
    },
    Event(ContractEvent),
    /// An error raised and caught inside a successful invocation.
    Error {
        contract: Option<ContractId>,
        error: ScError,
        data: ScVal,
    },
}

/// Build the trace of one `InvokeHostFunction` operation.
pub fn build_trace(
    host_function: &HostFunction,
    auth: &[SorobanAuthorizationEntry],
    events: &[ContractEvent],
    diagnostics: &[DiagnosticEvent],
) -> Vec<TraceItem> {
    if let Some(mut items) = from_diagnostics(diagnostics) {
        if !items.iter().any(|i| matches!(i, TraceItem::Event(_))) {
            items.extend(contract_events(events));
        }
        return items;
    }
    from_host_function(host_function, auth, events)
}

fn from_diagnostics(diagnostics: &[DiagnosticEvent]) -> Option<Vec<TraceItem>> {
    if !diagnostics
        .iter()
        .any(|d| marker(&d.event) == Some("fn_call"))
    {
        return None;
    }

    let mut items = Vec::new();
    let mut depth: u32 = 0;
    for diagnostic in diagnostics {
        let event = &diagnostic.event;
        match event.type_ {
            ContractEventType::Diagnostic => match marker(event) {
                Some("fn_call") if diagnostic.in_successful_contract_call => {
                    if let Some(item) = invoke_from_fn_call(event, depth) {
                        items.push(item);
                    }
                    depth += 1;
                }
                Some("fn_return") if diagnostic.in_successful_contract_call => {
                    depth = depth.saturating_sub(1);
                }
                Some("error") => {
                    if let Some(item) = error_item(event) {
                        items.push(item);
                    }
                }
                _ => {}
            },
            ContractEventType::Contract if diagnostic.in_successful_contract_call => {
                items.push(TraceItem::Event(event.clone()));
            }
            _ => {}
        }
    }
    Some(items)
}

fn from_host_function(
    host_function: &HostFunction,
    auth: &[SorobanAuthorizationEntry],
    events: &[ContractEvent],
) -> Vec<TraceItem> {
    let HostFunction::InvokeContract(invoke) = host_function else {
        return contract_events(events);
    };

    let mut items = vec![TraceItem::Invoke {
        contract: invoke.contract_address.clone(),
        function: symbol_to_string(invoke.function_name.0.as_slice()),
        args: invoke.args.to_vec(),
        depth: 0,
    }];
    items.extend(contract_events(events));

    let root = auth.iter().find(|entry| {
        matches!(
            &entry.root_invocation.function,
            SorobanAuthorizedFunction::ContractFn(f)
                if f.contract_address == invoke.contract_address
                    && f.function_name == invoke.function_name
        )
    });
    if let Some(root) = root {
        for sub in root.root_invocation.sub_invocations.iter() {
            push_authorized(sub, 1, &mut items);
        }
    }
    items
}

fn push_authorized(invocation: &SorobanAuthorizedInvocation, depth: u32, items: &mut Vec<TraceItem>) {
    let child_depth = match &invocation.function {
        SorobanAuthorizedFunction::ContractFn(f) => {
            items.push(TraceItem::Invoke {
                contract: f.contract_address.clone(),
                function: symbol_to_string(f.function_name.0.as_slice()),
                args: f.args.to_vec(),
                depth,
            });
            depth + 1
        }
        _ => depth,
    };
    for sub in invocation.sub_invocations.iter() {
        push_authorized(sub, child_depth, items);
    }
}

fn contract_events(events: &[ContractEvent]) -> Vec<TraceItem> {
    events
        .iter()
        .filter(|e| e.type_ == ContractEventType::Contract)
        .cloned()
        .map(TraceItem::Event)
        .collect()
}

/// `[Symbol fn_call, Bytes contract, Symbol function]`, data = args.
fn invoke_from_fn_call(event: &ContractEvent, depth: u32) -> Option<TraceItem> {
    let ContractEventBody::V0(body) = &event.body;
    let contract = match body.topics.get(1)? {
        ScVal::Bytes(bytes) => {
            let raw: [u8; 32] = bytes.0.as_slice().try_into().ok()?;
            ScAddress::Contract(ContractId(Hash(raw)))
        }
        ScVal::Address(address) => address.clone(),
        _ => return None,
    };
    let function = match body.topics.get(2)? {
        ScVal::Symbol(sym) => symbol_to_string(sym.0.as_slice()),
        _ => return None,
    };
    let args = match &body.data {
        ScVal::Vec(Some(values)) => values.0.to_vec(),
        ScVal::Vec(None) | ScVal::Void => Vec::new(),
        other => vec![other.clone()],
    };
    Some(TraceItem::Invoke {
        contract,
        function,
        args,
        depth,
    })
}

/// `[Symbol error, Error code]`, data = message.
fn error_item(event: &ContractEvent) -> Option<TraceItem> {
    let ContractEventBody::V0(body) = &event.body;
    let error = body.topics.iter().find_map(|topic| match topic {
        ScVal::Error(err) => Some(err.clone()),
        _ => None,
    })?;
    Some(TraceItem::Error {
        contract: event.contract_id.clone(),
        error,
        data: body.data.clone(),
    })
}

/// Symbol in the first topic of an event.
pub(crate) fn marker(event: &ContractEvent) -> Option<&str> {
    let ContractEventBody::V0(body) = &event.body;
    match body.topics.first()? {
        ScVal::Symbol(sym) => std::str::from_utf8(sym.0.as_slice()).ok(),
        _ => None,
    }
}

fn symbol_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::*;

    fn sym(value: &str) -> ScVal {
        ScVal::Symbol(ScSymbol(value.try_into().unwrap()))
    }

    fn diagnostic(topics: Vec<ScVal>, data: ScVal, ok: bool) -> DiagnosticEvent {
        DiagnosticEvent {
            in_successful_contract_call: ok,
            event: ContractEvent {
                ext: ExtensionPoint::V0,
                contract_id: None,
                type_: ContractEventType::Diagnostic,
                body: ContractEventBody::V0(ContractEventV0 {
                    topics: topics.try_into().unwrap(),
                    data,
                }),
            },
        }
    }

    fn fn_call(contract: u8, function: &str, ok: bool) -> DiagnosticEvent {
        diagnostic(
            vec![
                sym("fn_call"),
                ScVal::Bytes(ScBytes(vec![contract; 32].try_into().unwrap())),
                sym(function),
            ],
            ScVal::Vec(Some(ScVec(vec![ScVal::U32(1)].try_into().unwrap()))),
            ok,
        )
    }

    fn fn_return(function: &str, ok: bool) -> DiagnosticEvent {
        diagnostic(vec![sym("fn_return"), sym(function)], ScVal::Void, ok)
    }

    fn contract_event(contract: u8) -> ContractEvent {
        ContractEvent {
            ext: ExtensionPoint::V0,
            contract_id: Some(ContractId(Hash([contract; 32]))),
            type_: ContractEventType::Contract,
            body: ContractEventBody::V0(ContractEventV0 {
                topics: vec![sym("ping")].try_into().unwrap(),
                data: ScVal::Void,
            }),
        }
    }

    fn invoke_contract(contract: u8, function: &str) -> HostFunction {
        HostFunction::InvokeContract(InvokeContractArgs {
            contract_address: ScAddress::Contract(ContractId(Hash([contract; 32]))),
            function_name: ScSymbol(function.try_into().unwrap()),
            args: vec![].try_into().unwrap(),
        })
    }

    fn depths(items: &[TraceItem]) -> Vec<(String, u32)> {
        items
            .iter()
            .filter_map(|item| match item {
                TraceItem::Invoke {
                    function, depth, ..
                } => Some((function.clone(), *depth)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_stack_walk_nests_calls_and_events() {
        let diagnostics = vec![
            fn_call(1, "outer", true),
            DiagnosticEvent {
                in_successful_contract_call: true,
                event: contract_event(1),
            },
            fn_call(2, "inner", true),
            fn_return("inner", true),
            fn_return("outer", true),
        ];
        let items = build_trace(&invoke_contract(1, "outer"), &[], &[], &diagnostics);
        assert_eq!(
            depths(&items),
            vec![("outer".to_string(), 0), ("inner".to_string(), 1)]
        );
        assert!(matches!(items[1], TraceItem::Event(_)));
        match &items[0] {
            TraceItem::Invoke { args, .. } => assert_eq!(args, &vec![ScVal::U32(1)]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_failed_calls_are_dropped() {
        let diagnostics = vec![
            fn_call(1, "outer", true),
            fn_call(2, "broken", false),
            DiagnosticEvent {
                in_successful_contract_call: false,
                event: contract_event(2),
            },
            fn_return("broken", false),
            fn_return("outer", true),
        ];
        let items = build_trace(&invoke_contract(1, "outer"), &[], &[], &diagnostics);
        assert_eq!(depths(&items), vec![("outer".to_string(), 0)]);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_caught_error_is_kept() {
        let diagnostics = vec![
            fn_call(1, "outer", true),
            diagnostic(
                vec![sym("error"), ScVal::Error(ScError::Contract(3))],
                ScVal::Void,
                false,
            ),
            fn_return("outer", true),
        ];
        let items = build_trace(&invoke_contract(1, "outer"), &[], &[], &diagnostics);
        assert!(matches!(
            items[1],
            TraceItem::Error {
                error: ScError::Contract(3),
                ..
            }
        ));
    }

    #[test]
    fn test_fallback_uses_auth_tree() {
        let host_function = invoke_contract(1, "swap");
        let HostFunction::InvokeContract(root) = host_function.clone() else {
            unreachable!()
        };
        let child = SorobanAuthorizedInvocation {
            function: SorobanAuthorizedFunction::ContractFn(InvokeContractArgs {
                contract_address: ScAddress::Contract(ContractId(Hash([2u8; 32]))),
                function_name: ScSymbol("transfer".try_into().unwrap()),
                args: vec![].try_into().unwrap(),
            }),
            sub_invocations: vec![].try_into().unwrap(),
        };
        let auth = vec![SorobanAuthorizationEntry {
            credentials: SorobanCredentials::SourceAccount,
            root_invocation: SorobanAuthorizedInvocation {
                function: SorobanAuthorizedFunction::ContractFn(root),
                sub_invocations: vec![child].try_into().unwrap(),
            },
        }];
        let items = build_trace(&host_function, &auth, &[contract_event(1)], &[]);
        assert_eq!(
            depths(&items),
            vec![("swap".to_string(), 0), ("transfer".to_string(), 1)]
        );
        assert!(matches!(items[1], TraceItem::Event(_)));
    }
}
