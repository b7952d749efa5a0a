//! Common test fixtures shared across integration tests.

use sextant_ir::{
    Body, Callee, Field, Function, IfaceMethod, Instr, Local, Pos, Program, ProgramBuilder,
    Receiver, TypeRef, TypeShape,
};

/// A small but complete program: a project package with a struct satisfying
/// an interface, a main dispatching through that interface, and a
/// third-party call out of the project.
///
/// ```text
/// package app                      package fmt (third-party)
///
/// type Server struct { name }      func Println(...)
/// type Handler interface { Handle() }
///
/// func (s *Server) Handle() { fmt.Println(...) }
/// func main() {
///     s := &Server{}
///     var h Handler = s
///     h.Handle()
/// }
/// ```
pub fn shop_program() -> Program {
    let mut b = ProgramBuilder::new();
    let app = b.add_package("example.com/shop/app", "app", false);
    let fmt = b.add_package("fmt", "fmt", false);

    let server = b.declare_type(app, "Server", Some(Pos::new("server.go", 5)), true);
    b.define_type(
        server,
        TypeShape::Struct {
            fields: vec![Field {
                name: "name".to_string(),
                ty: TypeRef::Opaque,
                embedded: false,
            }],
        },
    );
    let handler = b.declare_type(app, "Handler", Some(Pos::new("handler.go", 3)), true);
    b.define_type(
        handler,
        TypeShape::Interface {
            methods: vec![IfaceMethod {
                name: "Handle".to_string(),
                exported: true,
                params: vec![],
                results: vec![],
            }],
            embeds: vec![],
        },
    );

    let println = b.add_function(Function {
        package: fmt,
        name: "Println".to_string(),
        pos: None,
        exported: true,
        receiver: None,
        params: vec![TypeRef::Opaque],
        results: vec![],
        body: None,
    });

    let handle = b.add_function(Function {
        package: app,
        name: "Handle".to_string(),
        pos: Some(Pos::new("server.go", 9)),
        exported: true,
        receiver: Some(Receiver {
            type_id: server,
            pointer: true,
        }),
        params: vec![TypeRef::Pointer(server)],
        results: vec![],
        body: None,
    });
    b.set_body(
        handle,
        Body {
            locals: 1,
            instrs: vec![Instr::Call {
                site: Pos::new("server.go", 10),
                callee: Callee::Static(println),
                args: vec![],
                results: vec![],
            }],
        },
    );

    let main = b.add_function(Function {
        package: app,
        name: "main".to_string(),
        pos: Some(Pos::new("main.go", 8)),
        exported: false,
        receiver: None,
        params: vec![],
        results: vec![],
        body: None,
    });
    b.set_body(
        main,
        Body {
            locals: 2,
            instrs: vec![
                Instr::Alloc {
                    dst: Local(0),
                    ty: server,
                },
                Instr::Assign {
                    dst: Local(1),
                    src: Local(0),
                },
                Instr::Call {
                    site: Pos::new("main.go", 12),
                    callee: Callee::Dynamic {
                        recv: Local(1),
                        method: "Handle".to_string(),
                    },
                    args: vec![],
                    results: vec![],
                },
            ],
        },
    );

    b.finish().expect("fixture should validate")
}
