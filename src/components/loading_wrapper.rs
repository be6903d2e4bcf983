//! `<cosmos-loading-wrapper>`: a ring of dots while `loading`, the slotted
//! content otherwise.

use std::rc::Rc;

use crate::engine::{ComponentDefinition, ComponentOptions, View, define_component, el, fragment};
use crate::schema::{Schema, SchemaMap};
use crate::utils::{css_vars, unindent};

pub const TAG: &str = "cosmos-loading-wrapper";

const DOTS: usize = 8;

const STYLES: &str = "
    .spinner-container {
      position: relative;
      width: 40px;
      height: 40px;
      margin: 0 auto;
    }

    .dot {
      position: absolute;
      top: 50%;
      left: 50%;
      width: 6px;
      height: 6px;
      border-radius: 50%;
      background: currentColor;
      transform: rotate(calc(var(--i) * 45deg)) translateY(-16px);
      animation: fade 0.8s linear infinite;
      animation-delay: calc(var(--i) * 0.1s);
    }

    @keyframes fade {
      0% { opacity: 1; }
      100% { opacity: 0.2; }
    }
";

pub fn definition() -> ComponentDefinition {
    define_component(ComponentOptions {
        name: TAG.into(),
        attrs: SchemaMap::new().with("loading", Schema::boolean().optional()),
        render: Some(Rc::new(|props| {
            let body: View = if props.read("loading").as_bool().unwrap_or(false) {
                el("div")
                    .class("spinner-container")
                    .children((0..DOTS).map(|i| el("div").class("dot").attr("style", css_vars([("i", i)])).into()))
                    .into()
            } else {
                el("slot").child("Loaded content").into()
            };
            fragment([el("style").child(unindent(STYLES)).into(), body])
        })),
        ..Default::default()
    })
}
