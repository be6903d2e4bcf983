//! `<cosmos-spinner>`: four pulsing dots, `md` or `xxs` sized.

use std::rc::Rc;

use crate::engine::{ComponentDefinition, ComponentOptions, RenderProps, View, define_component, el, fragment};
use crate::hooks::host_class_switch;
use crate::schema::{Schema, SchemaMap};
use crate::types::{Cleanup, SpinnerSize};
use crate::utils::{css_vars, unindent};

pub const TAG: &str = "cosmos-spinner";

const DOTS: usize = 4;

const STYLES: &str = "
    :host {
      display: inline-flex;
      gap: 4px;
      --size: 8px;
    }

    :host(.xxs) {
      gap: 1px;
      --size: 3px;
    }

    .dot-container {
      animation: pulse 1.2s ease-in-out infinite;
      animation-delay: calc(var(--i) * 0.15s);
    }

    .dot {
      width: var(--size);
      height: var(--size);
      border-radius: 50%;
      background: currentColor;
    }

    @keyframes pulse {
      0%, 100% { opacity: 0.2; }
      50% { opacity: 1; }
    }
";

fn setup(props: &RenderProps) -> Option<Cleanup> {
    let size = props.cell("size").cloned();
    Some(host_class_switch(props.host, &SpinnerSize::ALL, move || {
        let size = size.as_ref().map(|c| c.read()).unwrap_or_default();
        let size = size.as_str().and_then(SpinnerSize::parse).unwrap_or_default();
        Some(size.as_str().to_string())
    }))
}

pub fn definition() -> ComponentDefinition {
    define_component(ComponentOptions {
        name: TAG.into(),
        attrs: SchemaMap::new().with("size", Schema::enumeration(SpinnerSize::ALL).optional()),
        render: Some(Rc::new(|_| {
            let mut children: Vec<View> = vec![el("style").child(unindent(STYLES)).into()];
            children.extend((0..DOTS).map(|i| {
                el("div")
                    .class("dot-container")
                    .attr("style", css_vars([("i", i)]))
                    .child(el("div").class("dot"))
                    .into()
            }));
            fragment(children)
        })),
        setup: Some(Rc::new(setup)),
        ..Default::default()
    })
}
