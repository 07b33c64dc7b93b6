use webapp_server::Application;

pub fn main() {
    webapp_infra::web::run_web_app(Application);
}
